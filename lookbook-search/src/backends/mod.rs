//! Search backend implementations.
//!
//! Each module provides a struct implementing
//! [`crate::backend::SearchBackend`] for one provider.

pub mod bing;
pub mod duckduckgo;
pub mod serpapi;

use std::sync::Arc;

use crate::backend::SearchBackend;
use crate::config::LinksConfig;
use crate::types::BackendKind;

pub use bing::BingBackend;
pub use duckduckgo::DuckDuckGoBackend;
pub use serpapi::SerpApiBackend;

/// Build the backend selected by `kind`, with credentials from `config`.
///
/// Keyed backends are built even without a key; they report
/// [`crate::SearchError::MissingCredentials`] on use, which the pipeline
/// treats as zero results.
pub fn build(
    kind: BackendKind,
    config: &LinksConfig,
    client: reqwest::Client,
) -> Arc<dyn SearchBackend> {
    match kind {
        BackendKind::DuckDuckGo => Arc::new(DuckDuckGoBackend::new(client)),
        BackendKind::SerpApi => Arc::new(SerpApiBackend::new(client, config.serpapi_key.clone())),
        BackendKind::Bing => Arc::new(BingBackend::new(client, config.bing_key.clone())),
    }
}
