//! DuckDuckGo backend, the credential-free default.
//!
//! Uses the HTML-only endpoint at `https://html.duckduckgo.com/html/`
//! with the `in-en` region, which needs no JavaScript and no API key.

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::backend::SearchBackend;
use crate::error::SearchError;
use crate::types::{BackendKind, RawHit};

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

/// DuckDuckGo HTML scraper.
///
/// Always available, so the pipeline uses it as the safety net whenever
/// another backend comes back empty.
#[derive(Debug, Clone)]
pub struct DuckDuckGoBackend {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoBackend {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Point the backend at a different host (used with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    /// We parse out the `uddg` query parameter and URL-decode it.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawHit>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let response = self
            .client
            .post(format!("{}/html/", self.base_url))
            .form(&[("q", query), ("kl", "in-en")])
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, limit)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::DuckDuckGo
    }
}

/// Parse a DuckDuckGo HTML results page into raw hits, skipping ads.
pub(crate) fn parse_duckduckgo_html(html: &str, limit: usize) -> Result<Vec<RawHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;

    let mut hits = Vec::new();

    for element in document.select(&result_sel) {
        if hits.len() >= limit {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(url) = title_el
            .value()
            .attr("href")
            .and_then(DuckDuckGoBackend::extract_url)
        else {
            continue;
        };

        hits.push(RawHit { url, title });
    }

    tracing::debug!(count = hits.len(), "DuckDuckGo results parsed");
    Ok(hits)
}
