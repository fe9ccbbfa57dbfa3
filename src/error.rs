//! Error type for the image-analyzer library.
//!
//! Every failure in a request cycle maps onto one [`AnalyzerError`] variant.
//! The web handler never propagates these past itself: it formats the error
//! with `Display` and renders it into the page, so the `#[error]` strings
//! below are written for the person holding the browser, not for a log file.

use thiserror::Error;

/// All errors returned by the image-analyzer library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The form was submitted without a file.
    #[error("Please upload an image.")]
    MissingImage,

    /// The uploaded bytes could not be decoded or re-encoded as an image.
    #[error("Could not process this image format: {detail}")]
    UnsupportedImage { detail: String },

    // ── Upstream errors ───────────────────────────────────────────────────
    /// No API key is configured, so the inference API cannot be called.
    #[error("OPENROUTER_API_KEY is not set. Please add it to your .env file.")]
    MissingApiKey,

    /// The request never got a response (DNS, TLS, connection, timeout).
    #[error("Request to inference API failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The inference API answered with a non-2xx status.
    #[error("Inference API returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The inference API answered 2xx but the body was not JSON.
    #[error("Inference API returned a response that is not valid JSON: {detail}")]
    InvalidResponse { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<image::ImageError> for AnalyzerError {
    fn from(e: image::ImageError) -> Self {
        AnalyzerError::UnsupportedImage {
            detail: e.to_string(),
        }
    }
}
