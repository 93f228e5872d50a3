//! SerpApi backend (Google engine, India locale).
//!
//! Reads `shopping_results` first and then `organic_results`, so product
//! listings come ahead of editorial pages.

use async_trait::async_trait;
use serde::Deserialize;

use crate::backend::SearchBackend;
use crate::error::SearchError;
use crate::types::{BackendKind, RawHit};

const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// SerpApi JSON client. Needs an API key.
#[derive(Debug, Clone)]
pub struct SerpApiBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    shopping_results: Vec<SerpApiItem>,
    #[serde(default)]
    organic_results: Vec<SerpApiItem>,
}

#[derive(Debug, Deserialize)]
struct SerpApiItem {
    link: Option<String>,
    url: Option<String>,
    #[serde(default)]
    title: String,
}

impl SerpApiBackend {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Point the backend at a different host (used with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

#[async_trait]
impl SearchBackend for SerpApiBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawHit>, SearchError> {
        let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(SearchError::MissingCredentials("serpapi".into()));
        };

        tracing::trace!(query, "SerpApi search");

        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", key),
                ("gl", "in"),
                ("hl", "en"),
            ])
            .send()
            .await
            // reqwest errors carry the full URL, which includes the key.
            .map_err(|e| SearchError::Http(format!("SerpApi request failed: {}", e.without_url())))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("SerpApi HTTP error: {}", e.without_url())))?;

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("SerpApi response read failed: {}", e.without_url())))?;

        parse_serpapi_json(&body, limit)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::SerpApi
    }
}

/// Parse a SerpApi response body into raw hits.
pub(crate) fn parse_serpapi_json(body: &str, limit: usize) -> Result<Vec<RawHit>, SearchError> {
    let data: SerpApiResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("SerpApi JSON: {e}")))?;

    let hits: Vec<RawHit> = data
        .shopping_results
        .into_iter()
        .chain(data.organic_results)
        .filter_map(|item| {
            let url = item.link.or(item.url).filter(|u| !u.is_empty())?;
            Some(RawHit {
                url,
                title: item.title,
            })
        })
        .take(limit)
        .collect();

    tracing::debug!(count = hits.len(), "SerpApi results parsed");
    Ok(hits)
}
