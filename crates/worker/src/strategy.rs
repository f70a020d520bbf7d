//! Layered fetch resolution.
//!
//! Each intercepted GET runs through an ordered chain of strategies, each
//! of which either produces a response or reports a miss; the chain
//! short-circuits on the first hit:
//!
//! 1. [`CacheLookup`] — any open generation, no network touched
//! 2. [`NetworkFetch`] — live fetch, opportunistically cached on a 200
//! 3. [`OfflineFallback`] — the precached offline page, navigations only
//!
//! A chain that falls all the way through is answered by the worker with
//! a synthesized 404.

use std::sync::Arc;

use async_trait::async_trait;
use ember_client::{FetchResponse, Network, StatusCode, same_origin};
use ember_core::{CacheDb, CachedResponse, Error, WorkerConfig};
use url::Url;

use crate::event::{Request, WorkerResponse};

/// Everything a strategy may consult while resolving a request.
pub(crate) struct FetchContext {
    pub(crate) config: WorkerConfig,
    pub(crate) origin: Url,
    pub(crate) offline_url: Url,
    pub(crate) storage: CacheDb,
    pub(crate) network: Arc<dyn Network>,
}

/// One step of the fetch resolution chain.
#[async_trait]
pub(crate) trait FetchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce a response, or `None` to pass the request down the chain.
    async fn resolve(&self, ctx: &FetchContext, request: &Request) -> Option<WorkerResponse>;
}

/// The chain in policy order.
pub(crate) fn default_chain() -> Vec<Box<dyn FetchStrategy>> {
    vec![Box::new(CacheLookup), Box::new(NetworkFetch), Box::new(OfflineFallback)]
}

/// Serve from any open cache generation.
pub(crate) struct CacheLookup;

#[async_trait]
impl FetchStrategy for CacheLookup {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn resolve(&self, ctx: &FetchContext, request: &Request) -> Option<WorkerResponse> {
        match ctx.storage.match_response(request.url.as_str()).await {
            Ok(Some(entry)) => Some(WorkerResponse::from_cache(entry)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache lookup failed; treating as miss");
                None
            }
        }
    }
}

/// Go to the network; store a copy of a 200 in the current generation.
pub(crate) struct NetworkFetch;

#[async_trait]
impl FetchStrategy for NetworkFetch {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn resolve(&self, ctx: &FetchContext, request: &Request) -> Option<WorkerResponse> {
        match ctx.network.fetch(&request.url).await {
            Ok(response) => {
                if response.status == StatusCode::OK {
                    // A write failure must never cost the page its response.
                    if let Err(e) = store_runtime(ctx, request, &response).await {
                        tracing::warn!(url = %request.url, error = %e, "runtime cache write failed");
                    }
                }
                Some(WorkerResponse::from_network(&response))
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "network fetch failed");
                None
            }
        }
    }
}

/// Write a freshly fetched response into the current generation, subject
/// to the origin and size policies.
async fn store_runtime(ctx: &FetchContext, request: &Request, response: &FetchResponse) -> Result<(), Error> {
    if !ctx.config.cache_cross_origin && !same_origin(&ctx.origin, &request.url) {
        tracing::debug!(url = %request.url, "not caching cross-origin response");
        return Ok(());
    }

    if response.bytes.len() > ctx.config.max_entry_bytes {
        tracing::debug!(
            url = %request.url,
            size = response.bytes.len(),
            limit = ctx.config.max_entry_bytes,
            "not caching oversized response"
        );
        return Ok(());
    }

    let entry = CachedResponse {
        url: request.url.to_string(),
        status: response.status.as_u16(),
        headers: response.headers.clone(),
        body: response.bytes.to_vec(),
        fetched_at: chrono::Utc::now().to_rfc3339(),
    };
    ctx.storage.put_response(&ctx.config.cache_name, &entry).await
}

/// Serve the precached offline page to navigations.
pub(crate) struct OfflineFallback;

#[async_trait]
impl FetchStrategy for OfflineFallback {
    fn name(&self) -> &'static str {
        "offline-fallback"
    }

    async fn resolve(&self, ctx: &FetchContext, request: &Request) -> Option<WorkerResponse> {
        if !request.is_navigation() {
            return None;
        }

        match ctx.storage.match_response(ctx.offline_url.as_str()).await {
            Ok(Some(entry)) => Some(WorkerResponse::offline_fallback(entry)),
            Ok(None) => {
                tracing::warn!(offline_url = %ctx.offline_url, "offline fallback page is not cached");
                None
            }
            Err(e) => {
                tracing::warn!(offline_url = %ctx.offline_url, error = %e, "offline fallback lookup failed");
                None
            }
        }
    }
}
