//! Error types for the lookbook-search crate.
//!
//! These errors stay inside the pipeline: backends, the page fetcher and
//! configuration validation return them, and the orchestrator turns every
//! one of them into "no result" for the affected call. No API keys appear
//! in error messages.

/// Errors raised by search backends, page fetches and configuration checks.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request failed (transport error or non-success status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A request did not finish within its time budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// A backend response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A backend that needs an API key was selected without one.
    #[error("missing credentials for {0}")]
    MissingCredentials(String),

    /// A fetched page was too short to be a real listing page.
    #[error("body too short: {len} bytes (need {min})")]
    ShortBody {
        /// Bytes received.
        len: usize,
        /// Minimum accepted size.
        min: usize,
    },
}

/// Convenience type alias for lookbook-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
