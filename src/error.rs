//! Error types for the slide-forge pipeline.
//!
//! Only failures of the surrounding collaborators (the generative model call
//! and the deck writers) are represented here. Malformed markup never
//! produces an error: the walker and layout engine are total.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or writing a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// The generative model call failed; carries the upstream message verbatim.
    #[error("{0}")]
    Upstream(String),

    /// The credential required by the model client is not configured.
    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    /// The model answered without any choice to read text from.
    #[error("Model returned no choices")]
    EmptyCompletion,

    /// Transport failure talking to the model endpoint.
    #[cfg(feature = "openai")]
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read input or write output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A deck writer could not produce its output format.
    #[error("Rendering error: {0}")]
    Render(String),
}
