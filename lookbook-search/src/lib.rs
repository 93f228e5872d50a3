//! # lookbook-search
//!
//! Retailer discovery and validation for Lookbook outfit recommendations.
//!
//! Given a composed clothing query such as `"high waist jeans navy party"`,
//! this crate finds a small set of live, on-topic product-search links,
//! balanced between Indian and global retailers and between mainstream and
//! niche ones.
//!
//! ## Design
//!
//! - Pluggable web search backends (DuckDuckGo by default, SerpApi and Bing
//!   with API keys), with DuckDuckGo as the safety net
//! - Static retailer catalog: block list, category allow-lists, site-search
//!   templates and page markers
//! - Quota-driven validation queue favouring the configured India/niche mix
//! - Concurrent page validation with early stop and site-search fallback
//! - In-memory result cache with configurable TTL
//!
//! ## Failure model
//!
//! [`LinkPipeline::search_links`] never returns an error. Backend outages,
//! failed fetches and off-topic pages only make the result list shorter.
//! Queries are logged at trace level only.

pub mod backend;
pub mod backends;
pub mod cache;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod types;
pub mod variants;

pub use backend::SearchBackend;
pub use cache::{CacheStore, Clock, ManualClock, ResultCache, SystemClock};
pub use catalog::Catalog;
pub use config::LinksConfig;
pub use error::{Result, SearchError};
pub use orchestrator::pipeline::{LinkPipeline, LinkPipelineBuilder};
pub use orchestrator::validate::{HttpFetcher, PageFetcher};
pub use types::{BackendKind, Candidate, Category, PreferTier, RawHit, ResultCard, UserPrefs};

/// Find retailer links with a one-off pipeline built from `config`.
///
/// Each call builds a fresh pipeline, so nothing is cached between calls;
/// long-lived callers should keep a [`LinkPipeline`] instead.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Search failures
/// themselves only shorten the returned list.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> lookbook_search::Result<()> {
/// let config = lookbook_search::LinksConfig::default();
/// let prefs = lookbook_search::UserPrefs::default();
/// let cards = lookbook_search::search_links("high waist jeans", "party", &prefs, 6, config).await?;
/// for card in &cards {
///     println!("{}: {}", card.retailer, card.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_links(
    query: &str,
    vibe: &str,
    prefs: &UserPrefs,
    total_k: usize,
    config: LinksConfig,
) -> Result<Vec<ResultCard>> {
    let pipeline = LinkPipeline::from_config(config)?;
    Ok(pipeline.search_links(query, vibe, prefs, total_k).await)
}
