//! Trait definition for pluggable search backends.
//!
//! Each backend (DuckDuckGo, SerpApi, Bing) implements [`SearchBackend`] to
//! turn a query string into raw `{url, title}` hits. The pipeline holds the
//! configured backend and the default one as trait objects, so the choice is
//! made once at construction instead of on every query.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{BackendKind, RawHit};

/// A pluggable web search backend.
///
/// Implementors handle their own request construction, credentials and
/// response parsing. All implementations must be `Send + Sync` so one
/// instance can serve concurrent pipeline calls.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one query and return at most `limit` hits.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if credentials are missing, the request fails,
    /// or the response cannot be parsed. Callers treat every error as
    /// "no results".
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawHit>, SearchError>;

    /// Which [`BackendKind`] this implementation represents.
    fn kind(&self) -> BackendKind;
}
