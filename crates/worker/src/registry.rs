//! Worker registration and supersession.

use std::sync::Arc;

use ember_core::Error;
use tokio::sync::RwLock;

use crate::event::{Request, WorkerResponse};
use crate::worker::OfflineWorker;

/// Owns the currently active worker and rolls versions forward.
///
/// Mirrors platform semantics: a candidate worker installs and then
/// activates immediately (it skips the waiting hold). When that fails,
/// the previously active worker stays in control and the next `register`
/// call is the retry.
#[derive(Default)]
pub struct Registry {
    active: RwLock<Option<Arc<OfflineWorker>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install and activate a candidate worker, superseding the previous
    /// one on success.
    ///
    /// # Errors
    ///
    /// Propagates the candidate's install or activation failure; the
    /// previously registered worker, if any, keeps serving.
    pub async fn register(&self, worker: OfflineWorker) -> Result<Arc<OfflineWorker>, Error> {
        let worker = Arc::new(worker);

        worker.install().await?;
        worker.activate().await?;

        let mut active = self.active.write().await;
        if let Some(old) = active.replace(Arc::clone(&worker)) {
            old.supersede();
        }

        Ok(worker)
    }

    /// The worker currently controlling fetches, if any.
    pub async fn active(&self) -> Option<Arc<OfflineWorker>> {
        self.active.read().await.clone()
    }

    /// Route one intercepted request to the active worker.
    ///
    /// With no registered worker the request passes through untouched.
    pub async fn fetch(&self, request: &Request) -> Option<WorkerResponse> {
        let worker = self.active().await?;
        worker.handle_fetch(request).await
    }
}
