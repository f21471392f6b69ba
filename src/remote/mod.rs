//! Remote catalog access.
//!
//! Pure request builders, a blocking HTTP client, and a background fetcher
//! thread that keeps HTTP off the UI loop.

pub mod client;
pub mod fetcher;
pub mod request;

pub use client::CatalogClient;
pub use fetcher::{BackgroundFetcher, FetchRequest, FetchResult, FetcherStatus};

use thiserror::Error;

/// Remote call errors.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// URL construction failed.
    #[error("Invalid URL: {0}")]
    Url(String),

    /// Transport-level failure (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status.
    #[error("Server error: HTTP {0}")]
    Status(u16),

    /// Response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),
}
