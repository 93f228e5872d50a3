//! Bing Web Search API v7 backend (`en-IN` market).

use async_trait::async_trait;
use serde::Deserialize;

use crate::backend::SearchBackend;
use crate::error::SearchError;
use crate::types::{BackendKind, RawHit};

const DEFAULT_BASE_URL: &str = "https://api.bing.microsoft.com";

/// Bing Web Search JSON client. Needs a subscription key.
#[derive(Debug, Clone)]
pub struct BingBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    #[serde(default)]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Default, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingPage>,
}

#[derive(Debug, Deserialize)]
struct BingPage {
    url: Option<String>,
    #[serde(default)]
    name: String,
}

impl BingBackend {
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
impl SearchBackend for BingBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawHit>, SearchError> {
        let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(SearchError::MissingCredentials("bing".into()));
        };

        tracing::trace!(query, "Bing search");

        let count = limit.to_string();
        let response = self
            .client
            .get(format!("{}/v7.0/search", self.base_url))
            .query(&[("q", query), ("mkt", "en-IN"), ("count", count.as_str())])
            .header("Ocp-Apim-Subscription-Key", key)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Bing request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Bing HTTP error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("Bing response read failed: {e}")))?;

        parse_bing_json(&body, limit)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Bing
    }
}

/// Parse a Bing Web Search response body into raw hits.
pub(crate) fn parse_bing_json(body: &str, limit: usize) -> Result<Vec<RawHit>, SearchError> {
    let data: BingResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Parse(format!("Bing JSON: {e}")))?;

    let hits: Vec<RawHit> = data
        .web_pages
        .unwrap_or_default()
        .value
        .into_iter()
        .filter_map(|page| {
            let url = page.url.filter(|u| !u.is_empty())?;
            Some(RawHit {
                url,
                title: page.name,
            })
        })
        .take(limit)
        .collect();

    tracing::debug!(count = hits.len(), "Bing results parsed");
    Ok(hits)
}
