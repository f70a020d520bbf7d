//! Shared fixtures for worker tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use ember_client::{FetchResponse, Network, StatusCode};
use ember_core::{Error, WorkerConfig};
use url::Url;

/// In-memory [`Network`] fake.
///
/// Serves routed URLs, answers 404 for everything else, records every
/// request, and can be flipped offline so all fetches fail at the
/// transport level.
#[derive(Default)]
pub(crate) struct MockNetwork {
    routes: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl MockNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(&self, url: &str, status: u16, body: &[u8]) {
        self.routes.lock().unwrap().insert(url.to_string(), (status, body.to_vec()));
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == url).count()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        self.calls.lock().unwrap().push(url.to_string());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("connection refused".to_string()));
        }

        let routes = self.routes.lock().unwrap();
        let (status, body) = match routes.get(url.as_str()) {
            Some((status, body)) => (*status, body.clone()),
            None => (404, Vec::new()),
        };

        Ok(FetchResponse {
            url: url.clone(),
            status: StatusCode::from_u16(status).unwrap(),
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            bytes: Bytes::from(body),
            fetch_ms: 1,
        })
    }
}

/// Config pointing at a fake origin with a small realistic manifest.
pub(crate) fn test_config() -> WorkerConfig {
    WorkerConfig {
        cache_name: "app-v1".to_string(),
        origin: "https://app.example.org".to_string(),
        precache_manifest: vec![
            "/".to_string(),
            "/offline.html".to_string(),
            "/static/css/main.css".to_string(),
            "https://cdn.example.net/bootstrap.min.css".to_string(),
        ],
        ..Default::default()
    }
}

/// Routes for every entry in [`test_config`]'s manifest.
pub(crate) fn seed_manifest(network: &MockNetwork) {
    network.route("https://app.example.org/", 200, b"<html>home</html>");
    network.route("https://app.example.org/offline.html", 200, b"<html>offline</html>");
    network.route("https://app.example.org/static/css/main.css", 200, b"body { margin: 0 }");
    network.route("https://cdn.example.net/bootstrap.min.css", 200, b".btn { display: inline }");
}
