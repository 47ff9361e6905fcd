//! Error types
//!
//! `Error` covers whole-command failures (bad board file, server bind,
//! config parse). `DetailError` is the per-row outcome of a detail fetch
//! and never escapes the row it belongs to.

use thiserror::Error;

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Detail(#[from] DetailError),

    #[error("server error: {0}")]
    Server(String),

    #[error("terminal error: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a failed detail fetch
///
/// Cloneable so it can travel from the fetch worker to the UI thread and
/// be kept in the row state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetailError {
    /// Transport failure (connect, timeout, body read)
    #[error("request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Payload was not the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl DetailError {
    /// Malformed payloads are recovered locally (empty reasons); the rest
    /// put the row into the failed state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DetailError::MalformedResponse(_))
    }
}

impl From<reqwest::Error> for DetailError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DetailError::MalformedResponse(e.to_string())
        } else {
            DetailError::Http(e.to_string())
        }
    }
}
