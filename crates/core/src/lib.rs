//! Core types and shared functionality for ember.
//!
//! This crate provides:
//! - Generation-scoped response cache with SQLite backend
//! - Unified error types
//! - Worker configuration

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedResponse};
pub use config::{ConfigError, WorkerConfig};
pub use error::Error;
