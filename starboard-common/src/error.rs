//! Common error types for starboard

use std::path::PathBuf;

use thiserror::Error;

/// Common result type for starboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the starboard services
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream feed transport failure
    #[error("Feed request failed: {0}")]
    FetchNetwork(String),

    /// Upstream feed request exceeded the client timeout
    #[error("Feed request timed out: {0}")]
    FetchTimeout(String),

    /// Upstream feed responded with a non-success status
    #[error("Feed returned HTTP {status} for year {year}")]
    FetchStatus { year: i32, status: u16 },

    /// Upstream feed responded with something other than JSON
    #[error("Feed returned unexpected content type: {0:?}")]
    FetchContentType(String),

    /// Cache file read/write failure
    #[error("Cache I/O error at {path:?}: {source}")]
    CacheIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unexpected shape in upstream or cached JSON
    #[error("Malformed data: {context}")]
    MalformedData { context: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for any of the upstream fetch failure kinds.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            Error::FetchNetwork(_)
                | Error::FetchTimeout(_)
                | Error::FetchStatus { .. }
                | Error::FetchContentType(_)
        )
    }
}
