//! Pipeline configuration with sensible defaults.
//!
//! [`LinksConfig`] controls the search backend, target India/niche mix,
//! validation budget and cache lifetime. Every field has a default;
//! environment variables are applied by
//! [`LinksConfig::apply_env_overrides_from`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::BackendKind;

/// Budget used when the configured timeout is unusable.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);

/// Configuration for the retailer discovery pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Which search backend to query first. DuckDuckGo is always used as
    /// the safety net when another backend returns nothing.
    pub backend: BackendKind,
    /// How long to cache results in seconds. Set to 0 to disable caching.
    pub cache_ttl_seconds: u64,
    /// Target fraction of Indian retailers in the validation queue.
    pub indian_share: f64,
    /// Target fraction of niche (non-mainstream) retailers.
    pub niche_share: f64,
    /// Per-request HTTP timeout in seconds, for backends and page fetches.
    /// Fractions are honoured, so `0.5` is a 500 ms budget.
    pub timeout_seconds: f64,
    /// How many queued candidates the primary validation pass checks.
    pub max_check: usize,
    /// Maximum concurrent page validations.
    pub concurrency: usize,
    /// Stop aggregating once this many distinct-domain candidates exist.
    pub max_candidates: usize,
    /// Results requested from the backend per query variant.
    pub results_per_query: usize,
    /// Pages shorter than this are treated as failed fetches.
    pub min_body_bytes: usize,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// SerpApi key, required when `backend` is `serpapi`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serpapi_key: Option<String>,
    /// Bing Web Search key, required when `backend` is `bing`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bing_key: Option<String>,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::DuckDuckGo,
            cache_ttl_seconds: 1800,
            indian_share: 0.7,
            niche_share: 0.5,
            timeout_seconds: 6.0,
            max_check: 6,
            concurrency: 8,
            max_candidates: 60,
            results_per_query: 30,
            min_body_bytes: 1200,
            user_agent: None,
            serpapi_key: None,
            bing_key: None,
        }
    }
}

impl LinksConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `concurrency` must be greater than 0
    /// - `max_candidates` and `results_per_query` must be greater than 0
    /// - `indian_share` and `niche_share` must lie in `[0, 1]`
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.timeout_seconds.is_finite() && self.timeout_seconds > 0.0) {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(SearchError::Config(
                "concurrency must be greater than 0".into(),
            ));
        }
        if self.max_candidates == 0 || self.results_per_query == 0 {
            return Err(SearchError::Config(
                "max_candidates and results_per_query must be greater than 0".into(),
            ));
        }
        for (name, share) in [
            ("indian_share", self.indian_share),
            ("niche_share", self.niche_share),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(SearchError::Config(format!(
                    "{name} must be between 0 and 1, got {share}"
                )));
            }
        }
        Ok(())
    }

    /// The per-request timeout as a [`Duration`].
    ///
    /// Falls back to the default budget when `timeout_seconds` is not a
    /// positive finite number.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognised keys: `LINKS_CACHE_TTL`, `INDIAN_SHARE`, `NICHE_SHARE`,
    /// `HTTP_TIMEOUT`, `VALIDATION_MAXCHECK`, `VALIDATION_CONCURRENCY`,
    /// `SEARCH_PROVIDER`, `SERPAPI_KEY`, `BING_KEY`. Values that fail to
    /// parse are skipped with a warning.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "LINKS_CACHE_TTL") {
            self.cache_ttl_seconds = v;
        }
        if let Some(v) = parse_var(&lookup, "INDIAN_SHARE") {
            self.indian_share = v;
        }
        if let Some(v) = parse_var(&lookup, "NICHE_SHARE") {
            self.niche_share = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "HTTP_TIMEOUT") {
            if v.is_finite() && v > 0.0 {
                self.timeout_seconds = v;
            } else {
                tracing::warn!(value = v, "ignoring non-positive HTTP_TIMEOUT");
            }
        }
        if let Some(v) = parse_var(&lookup, "VALIDATION_MAXCHECK") {
            self.max_check = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "VALIDATION_CONCURRENCY") {
            self.concurrency = v.max(1);
        }
        if let Some(raw) = lookup("SEARCH_PROVIDER") {
            match BackendKind::parse(&raw) {
                Some(kind) => self.backend = kind,
                None => {
                    tracing::warn!(provider = %raw, "unknown SEARCH_PROVIDER; using ddg");
                    self.backend = BackendKind::DuckDuckGo;
                }
            }
        }
        if let Some(key) = lookup("SERPAPI_KEY").filter(|k| !k.trim().is_empty()) {
            self.serpapi_key = Some(key);
        }
        if let Some(key) = lookup("BING_KEY").filter(|k| !k.trim().is_empty()) {
            self.bing_key = Some(key);
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable override");
            None
        }
    }
}
