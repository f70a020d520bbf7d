//! Offline cache manager for ember.
//!
//! An embeddable, service-worker-style component that sits between a host
//! application and the network. It precaches a manifest of critical assets
//! at install time, intercepts GET requests with a cache-first policy,
//! falls back to the network and then to a static offline page, and evicts
//! whole cache generations when a new version activates.
//!
//! The host drives the worker through three entry points:
//!
//! - [`Registry::register`] installs and activates a new worker version
//! - [`OfflineWorker::handle_fetch`] answers one intercepted request
//! - [`KeepAlive::idle`] lets the host wait for in-flight handler work
//!   before tearing the worker down

pub mod event;
pub mod keepalive;
pub mod registry;
pub mod strategy;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;

pub use event::{Request, RequestMode, ServedFrom, WorkerResponse};
pub use keepalive::{KeepAlive, WorkGuard};
pub use registry::Registry;
pub use worker::{OfflineWorker, WorkerState};
