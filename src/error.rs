use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the crawler.
///
/// Only `Config`, `Io`, `Csv` and `Json` are fatal to a run. The other variants
/// describe a single seed or candidate that is skipped while the run continues.
#[derive(Debug, Error)]
pub enum Error {
    /// A seed URL could not be normalized into an http(s) URL with a host
    #[error("invalid input {input:?}: {reason}")]
    InvalidInput { input: String, reason: String },

    /// A single extraction candidate was malformed (e.g. a bad `data-cfemail` payload)
    #[error("extraction noise: {0}")]
    ExtractionNoise(String),

    #[error("failed to load config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error should abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config { .. } | Error::Io(_) | Error::Csv(_) | Error::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
