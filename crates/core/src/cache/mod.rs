//! SQLite-backed response cache, scoped by cache generation.
//!
//! The cache is a set of named generations, each an isolated store of
//! URL-keyed response snapshots. It supports:
//!
//! - Idempotent generation creation and whole-generation deletion
//! - Last-write-wins upserts keyed by (generation, url)
//! - Lookup across all open generations in creation order
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod migrations;
pub mod responses;

pub use crate::Error;

pub use connection::CacheDb;
pub use responses::CachedResponse;
