//! Network side of ember.
//!
//! This crate provides URL handling and the HTTP fetch client the worker
//! uses for precaching and network fallback. The `Network` trait is the
//! seam that lets tests drive the worker without touching the wire.

pub mod fetch;

pub use fetch::url::{UrlError, canonicalize, resolve, same_origin};
pub use fetch::{FetchConfig, FetchResponse, Network, NetworkClient};

pub use reqwest::{Method, StatusCode};
pub use url::Url;
