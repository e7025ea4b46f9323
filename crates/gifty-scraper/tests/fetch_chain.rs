//! Integration tests for `PageFetcher`'s proxy→direct fallback chain.
//!
//! Uses `wiremock` to stand up local HTTP servers for both the relay and
//! the target page so no real network traffic is made. Proxy settings are
//! passed explicitly; the env-reading path is a thin wrapper over the
//! same code.

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gifty_scraper::{PageFetcher, PageHeaders, ProxySettings};

fn test_fetcher() -> PageFetcher {
    PageFetcher::new(5, "gifty-test/0.1", "fr-FR,fr;q=0.9").expect("failed to build PageFetcher")
}

fn template_settings(relay_uri: &str) -> ProxySettings {
    ProxySettings {
        direct_url_template: Some(format!("{relay_uri}/relay?target={{URL}}")),
        ..ProxySettings::default()
    }
}

#[tokio::test]
async fn direct_fetch_returns_body_without_any_proxy() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>page</html>"))
        .mount(&target)
        .await;

    let body = test_fetcher()
        .fetch_page_with(
            &format!("{}/product", target.uri()),
            &ProxySettings::default(),
            &PageHeaders::default(),
        )
        .await
        .expect("direct fetch");
    assert_eq!(body, "<html>page</html>");
}

#[tokio::test]
async fn proxy_body_is_returned_when_relay_succeeds() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/relay"))
        .respond_with(ResponseTemplate::new(200).set_body_string("relayed body"))
        .mount(&relay)
        .await;

    // The target must never be contacted when the relay answers.
    let target = MockServer::start().await;

    let body = test_fetcher()
        .fetch_page_with(
            &format!("{}/product", target.uri()),
            &template_settings(&relay.uri()),
            &PageHeaders::default(),
        )
        .await
        .expect("proxied fetch");
    assert_eq!(body, "relayed body");
    assert!(
        target.received_requests().await.unwrap().is_empty(),
        "direct request must not be issued when the relay succeeds"
    );
}

#[tokio::test]
async fn relay_failure_falls_back_to_direct_request() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/relay"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&relay)
        .await;

    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string("direct body"))
        .mount(&target)
        .await;

    let body = test_fetcher()
        .fetch_page_with(
            &format!("{}/product", target.uri()),
            &template_settings(&relay.uri()),
            &PageHeaders::default(),
        )
        .await
        .expect("fallback fetch");
    assert_eq!(body, "direct body");

    // Exactly one relay attempt, no retries of the same provider.
    assert_eq!(relay.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_relay_falls_back_to_direct_request() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string("direct body"))
        .mount(&target)
        .await;

    // Port 9 is discard; connection refused in practice.
    let settings = ProxySettings {
        direct_url_template: Some("http://127.0.0.1:9/relay?target={URL}".to_string()),
        ..ProxySettings::default()
    };

    let body = test_fetcher()
        .fetch_page_with(
            &format!("{}/product", target.uri()),
            &settings,
            &PageHeaders::default(),
        )
        .await
        .expect("fallback fetch");
    assert_eq!(body, "direct body");
}

#[tokio::test]
async fn direct_body_is_returned_even_on_error_status() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found page"))
        .mount(&target)
        .await;

    let body = test_fetcher()
        .fetch_page_with(
            &format!("{}/product", target.uri()),
            &ProxySettings::default(),
            &PageHeaders::default(),
        )
        .await
        .expect("best-effort body");
    assert_eq!(body, "not found page");
}

#[tokio::test]
async fn both_paths_down_propagates_an_error() {
    let settings = ProxySettings {
        direct_url_template: Some("http://127.0.0.1:9/relay?target={URL}".to_string()),
        ..ProxySettings::default()
    };

    let result = test_fetcher()
        .fetch_page_with("http://127.0.0.1:9/product", &settings, &PageHeaders::default())
        .await;
    assert!(result.is_err(), "expected an error, got: {result:?}");
}

#[tokio::test]
async fn default_headers_are_attached_and_overridable() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(header("user-agent", "gifty-test/0.1"))
        .and(header("accept-language", "en,en;q=0.8"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&target)
        .await;

    let overrides = PageHeaders {
        user_agent: None,
        accept_language: Some("en,en;q=0.8".to_string()),
    };
    let body = test_fetcher()
        .fetch_page_with(
            &format!("{}/product", target.uri()),
            &ProxySettings::default(),
            &overrides,
        )
        .await
        .expect("fetch with overrides");
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn direct_template_api_key_travels_as_x_api_key_header() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/relay"))
        .and(header("x-api-key", "relay-secret"))
        .and(query_param(
            "target",
            "http://target.invalid/product",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("keyed body"))
        .mount(&relay)
        .await;

    let settings = ProxySettings {
        direct_url_template: Some(format!("{}/relay?target={{URL}}", relay.uri())),
        direct_api_key: Some("relay-secret".to_string()),
        ..ProxySettings::default()
    };

    let body = test_fetcher()
        .fetch_page_with(
            "http://target.invalid/product",
            &settings,
            &PageHeaders::default(),
        )
        .await
        .expect("keyed relay fetch");
    assert_eq!(body, "keyed body");
}
