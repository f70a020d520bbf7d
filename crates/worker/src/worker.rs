//! Worker lifecycle: install, activate, fetch interception.
//!
//! A worker moves through `Installing → Waiting → Active` and ends up
//! `Superseded` when a newer version takes over (or `Failed` when its
//! install aborts). Install precaches the manifest into the current
//! generation; activate evicts every other generation and claims control;
//! `handle_fetch` answers intercepted GETs through the strategy chain.
//!
//! Cache keys are absolute URLs: manifest entries are resolved against the
//! configured origin before precaching, and intercepted requests carry
//! absolute URLs already.

use std::sync::{Arc, PoisonError, RwLock};

use ember_client::{Method, Network, StatusCode, canonicalize, resolve};
use ember_core::{CacheDb, CachedResponse, Error, WorkerConfig};

use crate::event::{Request, WorkerResponse};
use crate::keepalive::KeepAlive;
use crate::strategy::{self, FetchContext, FetchStrategy};

/// Lifecycle states, in the order a healthy worker visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Waiting,
    Active,
    Failed,
    Superseded,
}

/// One versioned instance of the offline cache manager.
pub struct OfflineWorker {
    ctx: FetchContext,
    state: RwLock<WorkerState>,
    keep_alive: KeepAlive,
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl OfflineWorker {
    /// Build a worker over the given storage and network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the configured origin or offline
    /// path can't be parsed.
    pub fn new(config: WorkerConfig, storage: CacheDb, network: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = canonicalize(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let offline_url = resolve(&origin, &config.offline_path).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            ctx: FetchContext { config, origin, offline_url, storage, network },
            state: RwLock::new(WorkerState::Installing),
            keep_alive: KeepAlive::new(),
            strategies: strategy::default_chain(),
        })
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: WorkerState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Name of the generation this worker owns.
    pub fn cache_name(&self) -> &str {
        &self.ctx.config.cache_name
    }

    /// Keep-alive handle for the host to wait on before teardown.
    pub fn keep_alive(&self) -> &KeepAlive {
        &self.keep_alive
    }

    /// Precache the manifest into this worker's generation.
    ///
    /// Fails as a unit: the first entry that can't be fetched with a 200,
    /// exceeds the entry size limit, or can't be stored aborts the install
    /// and the worker is left `Failed`. Entries written before the failure
    /// may remain in storage; the attempt itself is never reported as
    /// complete. On success the worker skips the waiting hold.
    pub async fn install(&self) -> Result<(), Error> {
        let _work = self.keep_alive.hold();
        self.set_state(WorkerState::Installing);
        tracing::info!(cache = %self.cache_name(), "installing");

        match self.precache().await {
            Ok(entries) => {
                self.set_state(WorkerState::Waiting);
                tracing::info!(cache = %self.cache_name(), entries, "precache complete; skipping waiting hold");
                Ok(())
            }
            Err(e) => {
                self.set_state(WorkerState::Failed);
                tracing::warn!(cache = %self.cache_name(), error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let ctx = &self.ctx;
        ctx.storage.open_generation(&ctx.config.cache_name).await?;

        for entry in &ctx.config.precache_manifest {
            let url = resolve(&ctx.origin, entry).map_err(|e| Error::InvalidUrl(e.to_string()))?;

            let response = ctx
                .network
                .fetch(&url)
                .await
                .map_err(|e| Error::Precache { url: url.to_string(), detail: e.to_string() })?;

            if response.status != StatusCode::OK {
                return Err(Error::Precache {
                    url: url.to_string(),
                    detail: format!("status {}", response.status.as_u16()),
                });
            }

            if response.bytes.len() > ctx.config.max_entry_bytes {
                return Err(Error::EntryTooLarge {
                    url: url.to_string(),
                    size: response.bytes.len(),
                    limit: ctx.config.max_entry_bytes,
                });
            }

            let cached = CachedResponse {
                url: url.to_string(),
                status: response.status.as_u16(),
                headers: response.headers.clone(),
                body: response.bytes.to_vec(),
                fetched_at: chrono::Utc::now().to_rfc3339(),
            };
            ctx.storage.put_response(&ctx.config.cache_name, &cached).await?;
            tracing::debug!(url = %url, "precached");
        }

        Ok(ctx.config.precache_manifest.len())
    }

    /// Evict stale generations and claim control of fetches.
    ///
    /// Deletion is best-effort: a generation that can't be deleted is
    /// logged and skipped. Re-running with no version change touches
    /// nothing.
    pub async fn activate(&self) -> Result<(), Error> {
        let _work = self.keep_alive.hold();

        for name in self.ctx.storage.generation_names().await? {
            if name == self.cache_name() {
                continue;
            }
            match self.ctx.storage.delete_generation(&name).await {
                Ok(true) => tracing::info!(stale = %name, "deleted stale cache generation"),
                Ok(false) => {}
                Err(e) => tracing::warn!(stale = %name, error = %e, "failed to delete stale cache generation"),
            }
        }

        self.set_state(WorkerState::Active);
        tracing::info!(cache = %self.cache_name(), "activated; controlling all requests");
        Ok(())
    }

    /// Answer one intercepted request.
    ///
    /// Non-GET requests pass through untouched (`None`). GETs always get a
    /// substitution: the first strategy hit, or a synthesized 404 when
    /// nothing can serve the request.
    pub async fn handle_fetch(&self, request: &Request) -> Option<WorkerResponse> {
        if request.method != Method::GET {
            return None;
        }

        let _work = self.keep_alive.hold();

        for strategy in &self.strategies {
            if let Some(response) = strategy.resolve(&self.ctx, request).await {
                tracing::debug!(
                    strategy = strategy.name(),
                    url = %request.url,
                    status = %response.status,
                    "request resolved"
                );
                return Some(response);
            }
        }

        tracing::debug!(url = %request.url, "no content available offline");
        Some(WorkerResponse::unavailable())
    }

    pub(crate) fn supersede(&self) {
        self.set_state(WorkerState::Superseded);
        tracing::info!(cache = %self.cache_name(), "superseded by newer worker");
    }
}
