use harvest_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_client() -> HttpClient {
    HttpClient::builder()
        .system_proxy(false)
        .timeout(Duration::from_secs(5))
        .build()
        .expect("client builds")
}

#[tokio::test]
async fn get_text_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Grüße</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let html = local_client()
        .get_text(&format!("{}/article", server.uri()), RequestOpts::default())
        .await
        .expect("page fetched");
    assert_eq!(html, "<p>Grüße</p>");
}

#[tokio::test]
async fn non_success_status_is_api_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;

    let err = local_client()
        .get_text(&server.uri(), RequestOpts::default())
        .await
        .unwrap_err();
    match err {
        HttpError::Api {
            status, message, ..
        } => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(message, "busy");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_response_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = local_client()
        .get_text(
            &server.uri(),
            RequestOpts {
                timeout: Some(Duration::from_millis(200)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Timeout(_)), "{err:?}");
    assert!(err.is_transport());
}

#[tokio::test]
async fn post_json_sends_bearer_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/echo"))
        .and(header("authorization", "Bearer ya29.test"))
        .and(body_json(json!({"instances": [{"url": "https://a.example"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::builder()
        .base(&server.uri())
        .system_proxy(false)
        .build()
        .unwrap();
    let got: Value = client
        .post_json(
            "v1/echo",
            &json!({"instances": [{"url": "https://a.example"}]}),
            RequestOpts {
                auth: Some(Auth::Bearer("ya29.test")),
                ..Default::default()
            },
        )
        .await
        .expect("decoded");
    assert_eq!(got, json!({"ok": true}));
}

#[tokio::test]
async fn undecodable_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = local_client()
        .post_json::<_, Value>(&server.uri(), &json!({}), RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Decode(_, ref snip) if snip.contains("not json")));
}
