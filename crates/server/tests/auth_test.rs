//! # Authentication and CORS Tests
//!
//! Every non-preflight request must present the configured bearer token, and
//! every response carries the CORS headers.

mod common;

use common::{json_of, TestApp, TEST_API_KEY};
use reqwest::{header, Method, StatusCode};
use serde_json::json;
use sqlgate_server::config::AppConfig;
use sqlgate_test_utils::MockSessionProvider;

fn assert_cors(headers: &header::HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization"
    );
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, OPTIONS"
    );
}

#[tokio::test]
async fn missing_header_is_rejected() {
    let app = TestApp::spawn(MockSessionProvider::new()).await.unwrap();

    let response = app
        .client
        .get(app.url("/databases"))
        .send()
        .await
        .unwrap();
    assert_cors(response.headers());
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let (status, body) = json_of(response).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Missing or invalid Authorization header"}));
    assert_eq!(app.provider.connect_attempts(), 0);
}

#[tokio::test]
async fn malformed_headers_are_rejected_as_missing() {
    let app = TestApp::spawn(MockSessionProvider::new()).await.unwrap();

    for value in [
        format!("bearer {TEST_API_KEY}"),
        format!("Basic {TEST_API_KEY}"),
        TEST_API_KEY.to_string(),
        "Bearer ".to_string(),
        "Bearer".to_string(),
    ] {
        let response = app
            .client
            .get(app.url("/databases"))
            .header(header::AUTHORIZATION, value.as_str())
            .send()
            .await
            .unwrap();
        let (status, body) = json_of(response).await.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {value:?}");
        assert_eq!(body["error"], "Missing or invalid Authorization header");
    }
}

#[tokio::test]
async fn wrong_token_is_rejected_on_every_path_and_method() {
    let app = TestApp::spawn(MockSessionProvider::new()).await.unwrap();

    let cases = [
        (Method::GET, "/databases"),
        (Method::GET, "/tables?database=shop"),
        (Method::GET, "/schema?database=shop&table=orders"),
        (Method::GET, "/data?database=shop&table=orders"),
        (Method::POST, "/query"),
        (Method::GET, "/no/such/route"),
        (Method::DELETE, "/data"),
    ];
    for (method, path) in cases {
        let response = app
            .client
            .request(method.clone(), app.url(path))
            .bearer_auth("wrongtoken")
            .json(&json!({"database": "shop", "query": "SELECT 1"}))
            .send()
            .await
            .unwrap();
        assert_cors(response.headers());
        let (status, body) = json_of(response).await.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(body, json!({"error": "Invalid API key"}));
    }
    assert_eq!(app.provider.connect_attempts(), 0);
}

#[tokio::test]
async fn empty_configured_key_rejects_everything() {
    let app = TestApp::spawn_with_config(MockSessionProvider::new(), AppConfig::default())
        .await
        .unwrap();

    let response = app
        .client
        .get(app.url("/databases"))
        .bearer_auth("anything")
        .send()
        .await
        .unwrap();
    let (status, body) = json_of(response).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid API key");
}

#[tokio::test]
async fn preflight_skips_auth_and_has_empty_body() {
    let app = TestApp::spawn(MockSessionProvider::new()).await.unwrap();

    for path in ["/databases", "/query", "/no/such/route"] {
        let response = app
            .client
            .request(Method::OPTIONS, app.url(path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "OPTIONS {path}");
        assert_cors(response.headers());
        assert!(response.text().await.unwrap().is_empty());
    }
    assert_eq!(app.provider.connect_attempts(), 0);
}

#[tokio::test]
async fn unknown_route_with_valid_key_is_json_not_found() {
    let app = TestApp::spawn(MockSessionProvider::new()).await.unwrap();

    let response = app.get("/no/such/route").send().await.unwrap();
    assert_cors(response.headers());
    let (status, body) = json_of(response).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not found"}));
}
