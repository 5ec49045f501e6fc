use harvest_web::fetch::{FetchSettings, WebFetcher};
use harvest_web::politeness::FixedPoliteness;
use harvest_web::urls::UrlSet;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(timeout: Duration) -> WebFetcher {
    let settings = FetchSettings {
        timeout,
        system_proxy: false,
        ..Default::default()
    };
    let politeness = FixedPoliteness {
        delay: Duration::ZERO,
        user_agent: "harvest-test-agent/1.0".into(),
    };
    WebFetcher::new(&settings, Arc::new(politeness)).expect("fetcher builds")
}

#[tokio::test]
async fn sends_browser_headers_and_returns_html() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .and(header("user-agent", "harvest-test-agent/1.0"))
        .and(header("accept-language", "en-US,en;q=0.9"))
        .and(header("cache-control", "max-age=0"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>story</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let html = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/story", server.uri()))
        .await;
    assert_eq!(html.as_deref(), Some("<p>story</p>"));
}

#[tokio::test]
async fn http_error_status_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(fetcher(Duration::from_secs(5)).fetch(&server.uri()).await, None);
}

#[tokio::test]
async fn timeout_yields_none_and_the_loop_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>too late</p>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>on time</p>"))
        .mount(&server)
        .await;

    let slow = format!("{}/slow", server.uri());
    let fast = format!("{}/fast", server.uri());
    let urls: UrlSet = [slow.clone(), fast.clone()].into_iter().collect();

    let pages = fetcher(Duration::from_millis(300)).fetch_all(&urls).await;

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[&slow], None);
    assert_eq!(pages[&fast].as_deref(), Some("<p>on time</p>"));
}

#[tokio::test]
async fn unreachable_host_and_bad_url_yield_none() {
    // Port 9 (discard) on localhost is almost never listening.
    let f = fetcher(Duration::from_secs(2));
    assert_eq!(f.fetch("http://127.0.0.1:9/").await, None);
    assert_eq!(f.fetch("not a url").await, None);
}
