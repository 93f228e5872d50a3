//! Error types for the lookbook host crate.

use lookbook_search::SearchError;

/// Top-level error type for the lookbook application.
#[derive(Debug, thiserror::Error)]
pub enum LookbookError {
    /// Configuration file could not be parsed or is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Preference record could not be read or written.
    #[error("prefs error: {0}")]
    Prefs(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Host bridge protocol error (bad envelope, unwritable stdout).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Error from the link pipeline setup.
    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LookbookError>;
