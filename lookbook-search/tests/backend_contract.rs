//! HTTP contract tests for the search backends and the page fetcher.
//!
//! Each test points a component at a local wiremock server and checks the
//! request shape it sends and how it maps the response.

use lookbook_search::backends::{BingBackend, DuckDuckGoBackend, SerpApiBackend};
use lookbook_search::{HttpFetcher, PageFetcher, SearchBackend, SearchError};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

// ────────────────────────────────────────────────────────────────────────────
// SerpApi
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn serpapi_sends_india_locale_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google"))
        .and(query_param("q", "navy jeans buy online India"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("gl", "in"))
        .and(query_param("hl", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shopping_results": [
                {"link": "https://www.myntra.com/jeans", "title": "Myntra jeans"}
            ],
            "organic_results": [
                {"link": "https://www.ajio.com/p/1", "title": "AJIO jeans"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = SerpApiBackend::new(client(), Some("test-key".into())).with_base_url(server.uri());
    let hits = backend
        .search("navy jeans buy online India", 30)
        .await
        .expect("search should succeed");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, "https://www.myntra.com/jeans");
    assert_eq!(hits[1].title, "AJIO jeans");
}

#[tokio::test]
async fn serpapi_error_status_is_http_error_without_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let backend =
        SerpApiBackend::new(client(), Some("secret-key".into())).with_base_url(server.uri());
    let err = backend.search("jeans", 10).await.unwrap_err();

    assert!(matches!(err, SearchError::Http(_)));
    assert!(!err.to_string().contains("secret-key"));
}

#[tokio::test]
async fn serpapi_without_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = SerpApiBackend::new(client(), None).with_base_url(server.uri());
    let err = backend.search("jeans", 10).await.unwrap_err();
    assert!(matches!(err, SearchError::MissingCredentials(_)));
}

// ────────────────────────────────────────────────────────────────────────────
// Bing
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bing_sends_market_count_and_subscription_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v7.0/search"))
        .and(query_param("q", "kurta buy online India"))
        .and(query_param("mkt", "en-IN"))
        .and(query_param("count", "30"))
        .and(header("Ocp-Apim-Subscription-Key", "bing-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "webPages": {
                "value": [
                    {"name": "Kurtas | Fabindia", "url": "https://www.fabindia.com/kurtas"},
                    {"name": "Kurta sets | Soch", "url": "https://www.soch.com/kurta-sets"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = BingBackend::new(client(), Some("bing-key".into())).with_base_url(server.uri());
    let hits = backend
        .search("kurta buy online India", 30)
        .await
        .expect("search should succeed");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "Kurtas | Fabindia");
}

#[tokio::test]
async fn bing_malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v7.0/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let backend = BingBackend::new(client(), Some("bing-key".into())).with_base_url(server.uri());
    let err = backend.search("kurta", 10).await.unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)));
}

// ────────────────────────────────────────────────────────────────────────────
// DuckDuckGo
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duckduckgo_posts_query_with_region() {
    let server = MockServer::start().await;

    let html = r#"<html><body>
<div class="result results_links results_links_deep web-result">
  <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.nicobar.com%2Fproducts%2Fdress&amp;rut=x">Linen dress | Nicobar</a>
</div>
</body></html>"#;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .and(body_string_contains("kl=in-en"))
        .and(body_string_contains("q=linen+dress"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(&server)
        .await;

    let backend = DuckDuckGoBackend::new(client()).with_base_url(server.uri());
    let hits = backend.search("linen dress", 30).await.expect("search should succeed");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "https://www.nicobar.com/products/dress");
    assert_eq!(hits[0].title, "Linen dress | Nicobar");
}

#[tokio::test]
async fn duckduckgo_rate_limit_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let backend = DuckDuckGoBackend::new(client()).with_base_url(server.uri());
    let err = backend.search("dress", 10).await.unwrap_err();
    assert!(matches!(err, SearchError::Http(_)));
}

// ────────────────────────────────────────────────────────────────────────────
// Page fetcher
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetcher_returns_long_bodies() {
    let server = MockServer::start().await;
    let body = "x".repeat(1500);

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(client(), 1200);
    let fetched = fetcher
        .fetch(&format!("{}/search", server.uri()))
        .await
        .expect("fetch should succeed");
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn fetcher_rejects_short_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tiny"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(client(), 1200);
    let err = fetcher.fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(err, SearchError::ShortBody { len: 4, min: 1200 }));
}

#[tokio::test]
async fn fetcher_rejects_non_200() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(client(), 0);
    let err = fetcher.fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(err, SearchError::Http(_)));
}
