//! Error Types Module
//!
//! A single error enum for every fallible path in sunfit.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SunfitError>;

#[derive(Error, Debug)]
pub enum SunfitError {
    /// The requested location key is not in the profile store.
    ///
    /// This is the only failure of a prediction run and aborts it before any output.
    #[error("Unknown location {0}")]
    UnknownLocation(String),

    /// A date argument could not be understood.
    #[error("Invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    /// An observation row could not be normalized.
    #[error("Observation {index}: {reason}")]
    Observation { index: usize, reason: String },

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The chart backend failed to render or save a plot.
    #[error("Failed to draw {}: {reason}", .path.display())]
    Plot { path: PathBuf, reason: String },
}

impl SunfitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }

    pub(crate) fn plot(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Plot { path: path.into(), reason: reason.into() }
    }
}
