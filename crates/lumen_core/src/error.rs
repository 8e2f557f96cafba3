//! # Error Types
//!
//! The view core itself never fails: out-of-range lookups yield `None` and
//! invalid layer changes are ignored. Errors only surface while loading
//! configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up the toolkit.
#[derive(Error, Debug)]
pub enum UiError {
    /// The style/theme document could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl From<toml::de::Error> for UiError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidConfig(err.message().to_owned())
    }
}

/// Result type for toolkit setup operations.
pub type UiResult<T> = Result<T, UiError>;
