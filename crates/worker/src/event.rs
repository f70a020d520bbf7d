//! Request and response model for intercepted fetches.

use bytes::Bytes;
use ember_client::{FetchResponse, Method, StatusCode};
use ember_core::CachedResponse;
use url::Url;

/// Body of the synthesized response for uncached content while offline.
pub const OFFLINE_BODY: &str = "Content is not available offline.";

/// What a request is for: loading a full page, or a subresource such as a
/// stylesheet, script, or image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Subresource,
}

/// An outgoing request intercepted from the host page.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    pub fn new(method: Method, url: Url, mode: RequestMode) -> Self {
        Self { method, url, mode }
    }

    /// A GET for a subresource.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url, RequestMode::Subresource)
    }

    /// A GET whose intent is page navigation.
    pub fn navigate(url: Url) -> Self {
        Self::new(Method::GET, url, RequestMode::Navigate)
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// Where a substituted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
    OfflineFallback,
    Synthesized,
}

/// A response the worker substitutes for an intercepted request.
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub served_from: ServedFrom,
}

impl WorkerResponse {
    pub(crate) fn from_cache(entry: CachedResponse) -> Self {
        Self {
            status: StatusCode::from_u16(entry.status).unwrap_or(StatusCode::OK),
            headers: entry.headers,
            body: Bytes::from(entry.body),
            served_from: ServedFrom::Cache,
        }
    }

    pub(crate) fn from_network(response: &FetchResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.bytes.clone(),
            served_from: ServedFrom::Network,
        }
    }

    pub(crate) fn offline_fallback(entry: CachedResponse) -> Self {
        Self {
            status: StatusCode::from_u16(entry.status).unwrap_or(StatusCode::OK),
            headers: entry.headers,
            body: Bytes::from(entry.body),
            served_from: ServedFrom::OfflineFallback,
        }
    }

    /// Fixed 404 for uncached content with no network.
    pub(crate) fn unavailable() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            headers: vec![("content-type".to_string(), "text/plain; charset=utf-8".to_string())],
            body: Bytes::from_static(OFFLINE_BODY.as_bytes()),
            served_from: ServedFrom::Synthesized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_constructors() {
        let url = Url::parse("https://app.example.org/").unwrap();
        let nav = Request::navigate(url.clone());
        let sub = Request::get(url);
        assert!(nav.is_navigation());
        assert!(!sub.is_navigation());
        assert_eq!(nav.method, Method::GET);
    }

    #[test]
    fn test_unavailable_response() {
        let response = WorkerResponse::unavailable();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, Bytes::from_static(OFFLINE_BODY.as_bytes()));
        assert_eq!(response.served_from, ServedFrom::Synthesized);
    }

    #[test]
    fn test_from_cache_keeps_status() {
        let entry = CachedResponse {
            url: "/".to_string(),
            status: 200,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: b"home".to_vec(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        };
        let response = WorkerResponse::from_cache(entry);
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.served_from, ServedFrom::Cache);
        assert_eq!(response.body, Bytes::from_static(b"home"));
    }
}
