//! Error types for cogtrace-core

use thiserror::Error;

/// Main error type for the cogtrace-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A session log line could not be turned into a record.
    ///
    /// Fatal in strict mode: the whole load is aborted and no partial
    /// results are returned.
    #[error("load error at line {line}: {message}")]
    Load { line: usize, message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed pattern catalog entry, raised when the catalog is built
    #[error("invalid indicator {indicator:?} in category {category:?}: {message}")]
    Pattern {
        category: String,
        indicator: String,
        message: String,
    },
}

impl Error {
    pub(crate) fn load(line: usize, message: impl Into<String>) -> Self {
        Error::Load {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for cogtrace-core
pub type Result<T> = std::result::Result<T, Error>;
