//! Candidate aggregation across query variants.
//!
//! Each variant becomes one backend query. The configured backend is asked
//! first; when it is not the default backend and comes back empty (or
//! fails), the default backend answers the same query instead. Blocked hits
//! are dropped and the rest are deduplicated by domain.

use std::sync::Arc;

use crate::backend::SearchBackend;
use crate::catalog::Catalog;
use crate::types::{Candidate, RawHit};

use super::dedup::dedup_by_domain;

/// Suffix appended to every backend query.
const QUERY_SUFFIX: &str = "buy online India";

/// Queries the backends and collects distinct-domain candidates.
#[derive(Clone)]
pub struct Aggregator {
    primary: Arc<dyn SearchBackend>,
    fallback: Arc<dyn SearchBackend>,
    results_per_query: usize,
    max_candidates: usize,
}

impl Aggregator {
    pub fn new(
        primary: Arc<dyn SearchBackend>,
        fallback: Arc<dyn SearchBackend>,
        results_per_query: usize,
        max_candidates: usize,
    ) -> Self {
        Self {
            primary,
            fallback,
            results_per_query,
            max_candidates,
        }
    }

    /// Collect candidates for every variant until `max_candidates` distinct
    /// domains are found or the variants run out.
    pub async fn collect(&self, catalog: &Catalog, variants: &[String], vibe: &str) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::new();

        for variant in variants {
            let query = backend_query(variant, vibe);
            let hits = self.hits_for(&query).await;

            for hit in hits {
                let class = catalog.classify(&hit.url);
                if class.blocked {
                    continue;
                }
                candidates.push(Candidate::new(hit.url, class.domain, hit.title));
            }

            candidates = dedup_by_domain(candidates);
            if candidates.len() >= self.max_candidates {
                candidates.truncate(self.max_candidates);
                break;
            }
        }

        tracing::debug!(variants = variants.len(), candidates = candidates.len(), "aggregation done");
        candidates
    }

    /// Hits for one backend query. Errors are logged and count as empty.
    async fn hits_for(&self, query: &str) -> Vec<RawHit> {
        let hits = query_backend(self.primary.as_ref(), query, self.results_per_query).await;
        if !hits.is_empty() || self.primary.kind().is_default() {
            return hits;
        }

        tracing::debug!(
            primary = %self.primary.kind(),
            fallback = %self.fallback.kind(),
            "primary backend empty, using default backend"
        );
        query_backend(self.fallback.as_ref(), query, self.results_per_query).await
    }
}

async fn query_backend(backend: &dyn SearchBackend, query: &str, limit: usize) -> Vec<RawHit> {
    match backend.search(query, limit).await {
        Ok(hits) => {
            tracing::debug!(backend = %backend.kind(), count = hits.len(), "backend returned hits");
            hits
        }
        Err(err) => {
            tracing::warn!(backend = %backend.kind(), error = %err, "backend query failed");
            Vec::new()
        }
    }
}

/// Build the backend query for one variant: `"{variant} {vibe} buy online India"`.
pub fn backend_query(variant: &str, vibe: &str) -> String {
    let vibe = vibe.trim();
    if vibe.is_empty() {
        format!("{} {QUERY_SUFFIX}", variant.trim())
    } else {
        format!("{} {vibe} {QUERY_SUFFIX}", variant.trim())
    }
}
