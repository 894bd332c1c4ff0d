//! Error types for the extraction pipeline.

use std::time::Duration;

/// Errors that abort a pipeline run.
///
/// Only launch and navigation problems (and broken CDP transport) surface
/// here; heuristic stages degrade to fallback values inside a successful
/// run instead of failing it.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} timed out after {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },

    #[error("browser operation failed: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("unexpected page payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("invalid target url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type ScrapeResult<T> = Result<T, ScrapeError>;
