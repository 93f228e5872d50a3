//! Concurrent page validation.
//!
//! Candidates are fetched on a bounded [`JoinSet`] pool and inspected with
//! content heuristics. Results are consumed in completion order; once enough
//! pages have passed, nothing new is submitted and the tasks still in flight
//! are detached so they finish on their own without being awaited.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::task::JoinSet;

use crate::catalog::Catalog;
use crate::error::SearchError;
use crate::types::{Candidate, Category};
use crate::variants::clean_query;

use super::filter::search_title;

/// Phrases that mark an empty search page on any retailer.
const GENERIC_NO_RESULTS: &[&str] = &[
    "no results",
    "0 results",
    "no products found",
    "try removing filters",
];

/// Structured-data markers for product pages.
const PRODUCT_SCHEMA_MARKERS: &[&str] = &["\"@type\":\"product\"", "schema.org/product"];

/// Shopping affordances that, next to a rupee price, indicate a listing.
const CART_MARKERS: &[&str] = &["add to cart", "add to bag", "product"];

/// Link shapes counted towards the product-link threshold.
const PRODUCT_PATHS: &[&str] = &["/product", "/products/", "/p/"];

/// Product-like links needed to accept a page without other markers.
const MIN_PRODUCT_LINKS: usize = 5;

/// Distinct category keywords a page must mention when a category is known.
const MIN_CATEGORY_HITS: usize = 2;

/// Fetches a page body for validation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body.
    ///
    /// # Errors
    ///
    /// Any error (transport, non-200 status, short body) fails validation
    /// for that URL.
    async fn fetch(&self, url: &str) -> Result<String, SearchError>;
}

/// [`PageFetcher`] over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    min_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, min_body_bytes: usize) -> Self {
        Self {
            client,
            min_body_bytes,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("page request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SearchError::Http(format!("page returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("page read failed: {e}")))?;

        if body.len() < self.min_body_bytes {
            return Err(SearchError::ShortBody {
                len: body.len(),
                min: self.min_body_bytes,
            });
        }
        Ok(body)
    }
}

/// Whether a page plausibly lists purchasable products.
///
/// `body` must already be lowercased.
pub fn page_has_products(catalog: &Catalog, domain: &str, body: &str) -> bool {
    if catalog
        .no_result_markers(domain)
        .iter()
        .any(|m| body.contains(m.to_lowercase().as_str()))
    {
        return false;
    }
    if GENERIC_NO_RESULTS.iter().any(|p| body.contains(p)) {
        return false;
    }
    if catalog
        .positive_markers(domain)
        .iter()
        .any(|m| body.contains(m.to_lowercase().as_str()))
    {
        return true;
    }
    if PRODUCT_SCHEMA_MARKERS.iter().any(|m| body.contains(m)) {
        return true;
    }
    if body.contains('₹') && CART_MARKERS.iter().any(|m| body.contains(m)) {
        return true;
    }
    let product_links: usize = PRODUCT_PATHS.iter().map(|p| body.matches(p).count()).sum();
    product_links >= MIN_PRODUCT_LINKS
}

/// Whether a page mentions enough distinct keywords of `category`.
/// Always true without a category.
///
/// `body` must already be lowercased.
pub fn page_matches_category(catalog: &Catalog, body: &str, category: Option<Category>) -> bool {
    let Some(category) = category else {
        return true;
    };
    let hits = catalog
        .keywords(category)
        .iter()
        .filter(|k| body.contains(k.as_str()))
        .count();
    hits >= MIN_CATEGORY_HITS
}

/// Bounded-concurrency validator with early stop.
#[derive(Clone)]
pub struct Validator {
    fetcher: Arc<dyn PageFetcher>,
    catalog: Arc<Catalog>,
    concurrency: usize,
    fetch_timeout: Duration,
}

impl Validator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        catalog: Arc<Catalog>,
        concurrency: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            catalog,
            concurrency: concurrency.max(1),
            fetch_timeout,
        }
    }

    /// Validate `candidates`, returning up to `wanted` passing candidates in
    /// completion order.
    pub async fn run(
        &self,
        candidates: Vec<Candidate>,
        wanted: usize,
        query: &str,
        category: Option<Category>,
    ) -> Vec<Candidate> {
        let mut accepted = Vec::new();
        if wanted == 0 || candidates.is_empty() {
            return accepted;
        }

        let submitted = candidates.len();
        let query: Arc<str> = Arc::from(query);
        let mut pending = candidates.into_iter();
        let mut set = JoinSet::new();

        loop {
            while set.len() < self.concurrency {
                let Some(candidate) = pending.next() else {
                    break;
                };
                let this = self.clone();
                let query = Arc::clone(&query);
                set.spawn(async move { this.validate_candidate(candidate, &query, category).await });
            }

            let Some(joined) = set.join_next().await else {
                break;
            };
            match joined {
                Ok(Some(candidate)) => {
                    accepted.push(candidate);
                    if accepted.len() >= wanted {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(error = %err, "validation task failed"),
            }
        }

        let in_flight = set.len();
        set.detach_all();
        tracing::debug!(
            submitted,
            accepted = accepted.len(),
            in_flight,
            "validation pass done"
        );
        accepted
    }

    /// Validate one candidate, retrying once through the retailer's
    /// site-search page when the original URL cannot be fetched.
    pub async fn validate_candidate(
        &self,
        mut candidate: Candidate,
        query: &str,
        category: Option<Category>,
    ) -> Option<Candidate> {
        let body = match self.fetch(&candidate.url).await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(domain = %candidate.domain, error = %err, "fetch failed");
                let retry_url = self
                    .catalog
                    .site_search_url(&candidate.domain, &clean_query(query))
                    .filter(|url| *url != candidate.url)?;
                let title = search_title(query, &candidate.domain);
                candidate.rewrite(retry_url, title);
                match self.fetch(&candidate.url).await {
                    Ok(body) => body,
                    Err(err) => {
                        tracing::debug!(domain = %candidate.domain, error = %err, "site-search fetch failed");
                        return None;
                    }
                }
            }
        };

        let body = body.to_lowercase();
        if !page_has_products(&self.catalog, &candidate.domain, &body) {
            tracing::debug!(domain = %candidate.domain, "page shows no products");
            return None;
        }
        if !page_matches_category(&self.catalog, &body, category) {
            tracing::debug!(domain = %candidate.domain, "page off-category");
            return None;
        }
        Some(candidate)
    }

    async fn fetch(&self, url: &str) -> Result<String, SearchError> {
        tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| SearchError::Timeout(format!("page fetch exceeded {:?}", self.fetch_timeout)))?
    }
}
