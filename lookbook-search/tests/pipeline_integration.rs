//! Integration tests for the link pipeline.
//!
//! These tests run the whole pipeline against stub backends and stub page
//! fetchers, so no network access is needed.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lookbook_search::cache::MokaStore;
use lookbook_search::catalog::fill_template;
use lookbook_search::classify::domain_of;
use lookbook_search::variants::clean_query;
use lookbook_search::{
    BackendKind, Catalog, Category, LinkPipeline, LinksConfig, ManualClock, PageFetcher,
    PreferTier, RawHit, ResultCard, SearchBackend, SearchError, UserPrefs,
};

const PRODUCT_PAGE: &str = r#"<html><head>
<script type="application/ld+json">{"@type":"Product","name":"High Waist Jeans"}</script>
</head><body><h1>High waist jeans</h1><p>Stretch denim, navy wash.</p></body></html>"#;

struct StubBackend {
    kind: BackendKind,
    hits: Vec<RawHit>,
    calls: AtomicUsize,
}

impl StubBackend {
    fn new(kind: BackendKind, hits: Vec<RawHit>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            hits,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<RawHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hits.iter().take(limit).cloned().collect())
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }
}

type Accept = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Serves a product page for accepted URLs and fails everything else.
struct StubFetcher {
    accept: Accept,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn new(accept: impl Fn(&str) -> bool + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            accept: Box::new(accept),
            fetched: Mutex::new(Vec::new()),
        })
    }

    fn accept_all() -> Arc<Self> {
        Self::new(|_| true)
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("lock").clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SearchError> {
        self.fetched.lock().expect("lock").push(url.to_owned());
        if (self.accept)(url) {
            Ok(PRODUCT_PAGE.to_owned())
        } else {
            Err(SearchError::Http("503 Service Unavailable".into()))
        }
    }
}

fn jeans_hits() -> Vec<RawHit> {
    vec![
        RawHit::new("https://www.myntra.com/jeans/high-waist", "High Waist Jeans - Myntra"),
        RawHit::new("https://www.pinterest.com/pin/jeans", "Jeans outfit ideas"),
        RawHit::new("https://www.ajio.com/p/navy-jeans", "Navy jeans | AJIO"),
        RawHit::new("https://www.tatacliq.com/jeans/c-msh", "Women jeans | Tata CLiQ"),
        RawHit::new("https://www.fablestreet.com/products/jeans", "Jeans - FableStreet"),
        RawHit::new("https://www.zara.com/in/en/jeans-l1119.html", "Jeans | ZARA India"),
        RawHit::new("https://www.reddit.com/r/jeans", "Best jeans?"),
    ]
}

fn pipeline(
    config: LinksConfig,
    backend: Arc<StubBackend>,
    fetcher: Arc<StubFetcher>,
) -> LinkPipeline {
    LinkPipeline::builder(config)
        .backend(backend.clone())
        .fallback_backend(backend)
        .fetcher(fetcher)
        .rng_seed(42)
        .build()
        .expect("pipeline should build")
}

/// The domain a card was rendered for, recovered from its favicon URL.
fn card_domain(card: &ResultCard) -> &str {
    card.favicon
        .trim_start_matches("https://www.google.com/s2/favicons?domain=")
        .trim_end_matches("&sz=32")
}

fn assert_distinct(cards: &[ResultCard]) {
    let all: Vec<&str> = cards.iter().map(card_domain).collect();
    let unique: HashSet<&str> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len(), "duplicate domains in {all:?}");
}

#[tokio::test]
async fn repeated_call_within_ttl_is_served_from_cache() {
    let backend = StubBackend::new(BackendKind::DuckDuckGo, jeans_hits());
    let p = pipeline(LinksConfig::default(), backend.clone(), StubFetcher::accept_all());
    let prefs = UserPrefs::default();

    let first = p.search_links("high waist jeans", "party", &prefs, 3).await;
    let calls_after_first = backend.calls();
    let second = p.search_links("  High Waist JEANS ", "Party", &prefs, 3).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(backend.calls(), calls_after_first);
}

#[tokio::test]
async fn expired_entry_triggers_new_search() {
    let backend = StubBackend::new(BackendKind::DuckDuckGo, jeans_hits());
    let clock = Arc::new(ManualClock::new());
    let config = LinksConfig {
        cache_ttl_seconds: 60,
        ..Default::default()
    };
    let p = LinkPipeline::builder(config)
        .backend(backend.clone())
        .fallback_backend(backend.clone())
        .fetcher(StubFetcher::accept_all())
        .clock(clock.clone())
        .store(Arc::new(MokaStore::default()))
        .rng_seed(1)
        .build()
        .expect("build");
    let prefs = UserPrefs::default();

    p.search_links("jeans", "", &prefs, 3).await;
    let calls = backend.calls();
    clock.advance(Duration::from_secs(61));
    p.search_links("jeans", "", &prefs, 3).await;
    assert!(backend.calls() > calls);
}

#[tokio::test]
async fn zero_ttl_searches_every_time() {
    let backend = StubBackend::new(BackendKind::DuckDuckGo, jeans_hits());
    let config = LinksConfig {
        cache_ttl_seconds: 0,
        ..Default::default()
    };
    let p = pipeline(config, backend.clone(), StubFetcher::accept_all());
    let prefs = UserPrefs::default();

    p.search_links("high waist jeans", "", &prefs, 3).await;
    let calls_after_first = backend.calls();
    assert!(calls_after_first >= 1);
    p.search_links("high waist jeans", "", &prefs, 3).await;
    assert_eq!(backend.calls(), calls_after_first * 2);
}

#[tokio::test]
async fn result_never_exceeds_k_and_domains_are_distinct() {
    let hits: Vec<RawHit> = (0..20)
        .map(|i| RawHit::new(format!("https://shop{i}.example.com/products/{i}"), "Shop"))
        .chain(
            (0..5).map(|i| RawHit::new(format!("https://shop0.example.com/products/x{i}"), "Dup")),
        )
        .collect();
    let backend = StubBackend::new(BackendKind::DuckDuckGo, hits);
    let p = pipeline(LinksConfig::default(), backend, StubFetcher::accept_all());

    for k in [1, 3, 6] {
        let cards = p.search_links("navy top", &format!("k{k}"), &UserPrefs::default(), k).await;
        assert!(cards.len() <= k);
        assert_distinct(&cards);
    }
}

#[tokio::test]
async fn avoided_domain_never_appears_even_if_only_candidate() {
    let backend = StubBackend::new(
        BackendKind::DuckDuckGo,
        vec![RawHit::new("https://www.myntra.com/jeans", "Jeans - Myntra")],
    );
    let fetcher = StubFetcher::accept_all();
    let p = pipeline(LinksConfig::default(), backend, fetcher.clone());
    let prefs = UserPrefs {
        prefer_tier: PreferTier::Balanced,
        avoid_domains: BTreeSet::from(["www.Myntra.com".to_owned()]),
    };

    let cards = p.search_links("high waist jeans", "", &prefs, 6).await;
    assert!(cards.iter().all(|c| !c.url.contains("myntra.com")));
    assert!(fetcher.fetched().iter().all(|u| !u.contains("myntra.com")));
}

#[tokio::test]
async fn blocked_domains_never_appear() {
    let backend = StubBackend::new(
        BackendKind::DuckDuckGo,
        vec![
            RawHit::new("https://www.pinterest.com/search/?q=top", "Top ideas"),
            RawHit::new("https://www.youtube.com/watch?v=1", "Haul"),
            RawHit::new("https://shop.example.com/products/top", "Navy top"),
        ],
    );
    let p = pipeline(LinksConfig::default(), backend, StubFetcher::accept_all());
    let cards = p.search_links("navy top", "", &UserPrefs::default(), 6).await;

    let catalog = Catalog::builtin();
    for card in &cards {
        let domain = domain_of(&card.url).expect("card URL has a host");
        assert!(!catalog.is_blocked(&domain), "{domain} is blocked");
    }
    assert!(cards.iter().any(|c| c.url == "https://shop.example.com/products/top"));
}

#[tokio::test]
async fn category_allow_list_bounds_output() {
    let backend = StubBackend::new(BackendKind::DuckDuckGo, jeans_hits());
    let p = pipeline(LinksConfig::default(), backend, StubFetcher::accept_all());
    let cards = p.search_links("high waist jeans", "", &UserPrefs::default(), 6).await;

    let catalog = Catalog::builtin();
    let allowed = catalog.allowed_domains(Category::Jeans).expect("allow-list");
    let retailers: Vec<&str> = cards.iter().map(|c| c.retailer.as_str()).collect();
    assert!(!cards.is_empty());
    assert!(!retailers.contains(&"Fablestreet"));
    for card in &cards {
        let domain = card_domain(card);
        assert!(allowed.contains(domain), "{domain} not allowed");
    }
}

#[tokio::test]
async fn non_default_primary_falls_back_to_default_backend() {
    let serp = StubBackend::new(BackendKind::SerpApi, vec![]);
    let ddg = StubBackend::new(BackendKind::DuckDuckGo, jeans_hits());
    let p = LinkPipeline::builder(LinksConfig::default())
        .backend(serp.clone())
        .fallback_backend(ddg.clone())
        .fetcher(StubFetcher::accept_all())
        .rng_seed(5)
        .build()
        .expect("build");

    let cards = p.search_links("high waist jeans", "", &UserPrefs::default(), 3).await;
    assert!(serp.calls() >= 1);
    assert_eq!(ddg.calls(), serp.calls());
    assert_eq!(cards.len(), 3);
}

#[tokio::test]
async fn zero_primary_successes_fall_back_to_site_search_templates() {
    let hits: Vec<RawHit> = (0..8)
        .map(|i| RawHit::new(format!("https://shop{i}.example.com/products/top"), "Navy top"))
        .collect();
    let backend = StubBackend::new(BackendKind::DuckDuckGo, hits);
    let query = "navy top buy online";

    let catalog = Catalog::builtin();
    let site_query = clean_query(query);
    let templates: HashSet<String> = catalog
        .fallback_sites
        .iter()
        .map(|s| fill_template(&s.template, &site_query))
        .collect();
    let accepted = templates.clone();
    let fetcher = StubFetcher::new(move |url| accepted.contains(url));

    let p = pipeline(LinksConfig::default(), backend, fetcher.clone());
    let cards = p.search_links(query, "", &UserPrefs::default(), 4).await;

    assert_eq!(cards.len(), 4);
    for card in &cards {
        assert!(templates.contains(&card.url), "{} is not a template URL", card.url);
    }
    assert_distinct(&cards);
}

#[tokio::test]
async fn jeans_scenario_returns_exactly_three_validated_cards() {
    let mut catalog = Catalog::builtin();
    catalog
        .category_allowed
        .get_mut(&Category::Jeans)
        .expect("jeans allow-list")
        .insert("denimlabel.in".to_owned());
    let catalog = Arc::new(catalog);

    let passing = [
        "https://www.myntra.com/jeans/high-waist-navy",
        "https://www.ajio.com/p/high-waist-jeans-navy",
        "https://denimlabel.in/products/high-waist-jeans",
    ];
    let mut hits: Vec<RawHit> = passing
        .iter()
        .map(|u| RawHit::new(*u, "High waist jeans"))
        .collect();
    hits.push(RawHit::new("https://www.tatacliq.com/jeans/c-msh", "Jeans | Tata CLiQ"));
    hits.push(RawHit::new("https://www.zara.com/in/en/jeans-l1119.html", "Jeans | ZARA"));

    let backend = StubBackend::new(BackendKind::DuckDuckGo, hits);
    let fetcher = StubFetcher::new(move |url| passing.contains(&url));
    let p = LinkPipeline::builder(LinksConfig::default())
        .backend(backend.clone())
        .fallback_backend(backend)
        .fetcher(fetcher)
        .catalog(catalog.clone())
        .rng_seed(9)
        .build()
        .expect("build");

    let query = "high waist jeans navy party";
    assert_eq!(
        lookbook_search::variants::infer_category(&catalog, query),
        Some(Category::Jeans)
    );
    let cards = p.search_links(query, "party", &UserPrefs::default(), 6).await;

    assert_eq!(cards.len(), 3);
    assert_distinct(&cards);
    let urls: HashSet<&str> = cards.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(urls, HashSet::from(passing));
    let names: HashSet<&str> = cards.iter().map(|c| c.retailer.as_str()).collect();
    assert_eq!(names, HashSet::from(["Myntra", "Ajio", "Denimlabel"]));
}

/// How many of the six URLs first presented to the validator are niche.
async fn presented_niche_share(tier: PreferTier) -> usize {
    let mut catalog = Catalog::builtin();
    let mut hits = Vec::new();
    for i in 0..6 {
        for domain in [
            format!("big{i}.in"),
            format!("small{i}.in"),
            format!("big{i}.com"),
            format!("small{i}.com"),
        ] {
            if domain.starts_with("big") {
                catalog.mainstream.insert(domain.clone());
            }
            hits.push(RawHit::new(format!("https://{domain}/products/top"), "Navy top"));
        }
    }

    let backend = StubBackend::new(BackendKind::DuckDuckGo, hits);
    let fetcher = StubFetcher::new(|_| false);
    let config = LinksConfig {
        concurrency: 1,
        max_check: 6,
        ..Default::default()
    };
    let p = LinkPipeline::builder(config)
        .backend(backend.clone())
        .fallback_backend(backend)
        .fetcher(fetcher.clone())
        .catalog(Arc::new(catalog))
        .rng_seed(11)
        .build()
        .expect("build");

    let prefs = UserPrefs {
        prefer_tier: tier,
        avoid_domains: BTreeSet::new(),
    };
    p.search_links("navy top", "", &prefs, 6).await;

    fetcher
        .fetched()
        .iter()
        .take(6)
        .filter(|u| u.contains("://small"))
        .count()
}

#[tokio::test]
async fn niche_tier_presents_at_least_as_many_niche_domains() {
    let niche = presented_niche_share(PreferTier::Niche).await;
    let mainstream = presented_niche_share(PreferTier::Mainstream).await;
    assert!(niche >= mainstream, "niche {niche} < mainstream {mainstream}");
    assert_eq!(niche, 4);
    assert_eq!(mainstream, 2);
}

#[tokio::test]
async fn nothing_found_is_an_empty_list_not_an_error() {
    let backend = StubBackend::new(BackendKind::DuckDuckGo, vec![]);
    let p = pipeline(LinksConfig::default(), backend, StubFetcher::new(|_| false));
    let cards = p.search_links("navy top", "", &UserPrefs::default(), 6).await;
    assert!(cards.is_empty());
}
