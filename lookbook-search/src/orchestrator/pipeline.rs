//! The end-to-end link pipeline.
//!
//! Cache lookup, category inference, variant generation, aggregation,
//! filtering, queue construction, validation with fallback, rendering and
//! cache store, in that order. Every failure inside the pipeline shrinks the
//! result list instead of surfacing as an error.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::backend::SearchBackend;
use crate::backends;
use crate::cache::{CacheKey, CacheStore, Clock, MokaStore, ResultCache, SystemClock};
use crate::catalog::Catalog;
use crate::config::LinksConfig;
use crate::error::SearchError;
use crate::http;
use crate::types::{BackendKind, ResultCard, UserPrefs};
use crate::variants::{infer_category, query_variants};

use super::aggregate::Aggregator;
use super::fallback::{fallback_candidates, Exclusions};
use super::filter::filter_candidates;
use super::render::render_cards;
use super::schedule::{build_queue, Targets};
use super::validate::{HttpFetcher, PageFetcher, Validator};

/// Retailer discovery and validation pipeline.
///
/// Build one per process with [`LinkPipeline::from_config`] (or
/// [`LinkPipeline::builder`] to inject collaborators) and share it; the
/// result cache lives inside it.
pub struct LinkPipeline {
    config: LinksConfig,
    catalog: Arc<Catalog>,
    aggregator: Aggregator,
    validator: Validator,
    cache: ResultCache,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for LinkPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkPipeline")
            .field("backend", &self.config.backend)
            .field("cache_enabled", &self.cache.is_enabled())
            .finish_non_exhaustive()
    }
}

/// Builder for [`LinkPipeline`]. Anything not injected gets the production
/// default.
pub struct LinkPipelineBuilder {
    config: LinksConfig,
    backend: Option<Arc<dyn SearchBackend>>,
    fallback_backend: Option<Arc<dyn SearchBackend>>,
    fetcher: Option<Arc<dyn PageFetcher>>,
    catalog: Option<Arc<Catalog>>,
    clock: Option<Arc<dyn Clock>>,
    store: Option<Arc<dyn CacheStore>>,
    rng_seed: Option<u64>,
}

impl LinkPipelineBuilder {
    /// The configured (primary) search backend.
    pub fn backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// The default backend used when the primary one comes back empty.
    pub fn fallback_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.fallback_backend = Some(backend);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Seed the shuffle RNG for reproducible bucket and fallback order.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for invalid configuration, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<LinkPipeline, SearchError> {
        self.config.validate()?;
        let config = self.config;

        let needs_client =
            self.backend.is_none() || self.fallback_backend.is_none() || self.fetcher.is_none();
        let shared_client = if needs_client {
            Some(http::build_client(&config)?)
        } else {
            None
        };
        let make_client = || shared_client.clone().unwrap_or_default();

        let backend = match self.backend {
            Some(backend) => backend,
            None => backends::build(config.backend, &config, make_client()),
        };
        let fallback_backend = match self.fallback_backend {
            Some(backend) => backend,
            None => backends::build(BackendKind::DuckDuckGo, &config, make_client()),
        };
        let fetcher: Arc<dyn PageFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(make_client(), config.min_body_bytes)),
        };
        let catalog = self.catalog.unwrap_or_else(Catalog::shared);
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let store: Arc<dyn CacheStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MokaStore::default()),
        };
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let timeout = config.timeout();
        tracing::debug!(
            backend = %backend.kind(),
            cache_ttl = config.cache_ttl_seconds,
            "link pipeline ready"
        );

        Ok(LinkPipeline {
            aggregator: Aggregator::new(
                backend,
                fallback_backend,
                config.results_per_query,
                config.max_candidates,
            ),
            validator: Validator::new(fetcher, Arc::clone(&catalog), config.concurrency, timeout),
            cache: ResultCache::new(Duration::from_secs(config.cache_ttl_seconds), clock, store),
            rng: Mutex::new(rng),
            catalog,
            config,
        })
    }
}

impl LinkPipeline {
    pub fn builder(config: LinksConfig) -> LinkPipelineBuilder {
        LinkPipelineBuilder {
            config,
            backend: None,
            fallback_backend: None,
            fetcher: None,
            catalog: None,
            clock: None,
            store: None,
            rng_seed: None,
        }
    }

    /// Production wiring: real backends, HTTP fetcher, builtin catalog.
    ///
    /// # Errors
    ///
    /// Same as [`LinkPipelineBuilder::build`].
    pub fn from_config(config: LinksConfig) -> Result<Self, SearchError> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &LinksConfig {
        &self.config
    }

    /// Find up to `total_k` validated retailer links for a composed query.
    ///
    /// Returns at most one card per domain. A shorter (or empty) list means
    /// nothing better was found; this never fails.
    pub async fn search_links(
        &self,
        query: &str,
        vibe: &str,
        prefs: &UserPrefs,
        total_k: usize,
    ) -> Vec<ResultCard> {
        if total_k == 0 {
            return Vec::new();
        }

        let key = CacheKey::new(query, vibe, prefs.prefer_tier, total_k);
        if let Some(cards) = self.cache.get(&key).await {
            tracing::debug!(cards = cards.len(), "link cache hit");
            return cards;
        }
        tracing::trace!(query, vibe, tier = %prefs.prefer_tier, total_k, "link search");

        let catalog = self.catalog.as_ref();
        let category = infer_category(catalog, query);
        let variants = query_variants(query, category);
        tracing::debug!(category = ?category, variants = variants.len(), "query variants");

        let candidates = self.aggregator.collect(catalog, &variants, vibe).await;
        let avoid = prefs.normalized_avoid_domains();
        let filtered = filter_candidates(catalog, candidates, category, &avoid, query);

        let targets = Targets::compute(
            total_k,
            self.config.indian_share,
            self.config.niche_share,
            prefs.prefer_tier,
        );
        let plan = build_queue(catalog, filtered, total_k, targets, &mut *self.rng());

        let mut validated = self
            .validator
            .run(plan.head(self.config.max_check), total_k, query, category)
            .await;

        if validated.len() < total_k {
            let need = total_k - validated.len();
            let exclusions = Exclusions {
                avoid: Some(&avoid),
                validated: validated.iter().map(|c| c.domain.clone()).collect(),
            };
            let fallback =
                fallback_candidates(catalog, query, category, need, &exclusions, &mut *self.rng());
            let extra = self.validator.run(fallback, need, query, category).await;
            tracing::debug!(need, recovered = extra.len(), "fallback pass done");
            validated.extend(extra);
        }

        let cards = render_cards(catalog, validated, total_k);
        tracing::debug!(cards = cards.len(), "link search done");
        self.cache.insert(key, cards.clone()).await;
        cards
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }
}
