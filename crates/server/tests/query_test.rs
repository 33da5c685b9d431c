//! # Ad-hoc Query Endpoint Tests
//!
//! `POST /query`: parameter checks, the SELECT-only gate, result shape, and
//! error mapping.

mod common;

use common::{json_of, TestApp};
use reqwest::{header, StatusCode};
use serde_json::json;
use sqlgate_server::config::AppConfig;
use sqlgate_test_utils::{row_set, Call, MockSessionProvider};
use std::time::Duration;

const UNSAFE: &str = "Invalid or unsafe query. Only SELECT queries are allowed.";
const REQUIRED: &str = "Database and query parameters are required";

#[tokio::test]
async fn select_returns_columns_rows_and_timing() {
    let text = "SELECT id, name FROM users ORDER BY id";
    let provider = MockSessionProvider::new().with_reply(
        text,
        row_set(
            &["id", "name"],
            vec![vec![json!(1), json!("Ann")], vec![json!(2), json!("Bo")]],
        ),
    );
    let app = TestApp::spawn(provider).await.unwrap();

    let (status, body) = json_of(
        app.post_json("/query", &json!({"database": "shop", "query": text}))
            .send()
            .await
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], json!(["id", "name"]));
    assert_eq!(body["rows"], json!([[1, "Ann"], [2, "Bo"]]));
    assert_eq!(body["rowCount"], 2);
    assert!(body["executionTimeMs"].as_f64().unwrap() >= 0.0);
    assert_eq!(
        app.provider.calls(),
        [
            Call::SelectDatabase("shop".into()),
            Call::QueryRaw(text.into())
        ]
    );
    assert_eq!(app.provider.closed(), 1);
}

#[tokio::test]
async fn empty_result_has_no_columns() {
    let text = "SELECT id FROM users WHERE 1 = 0";
    let provider = MockSessionProvider::new().with_reply(text, row_set(&["id"], vec![]));
    let app = TestApp::spawn(provider).await.unwrap();

    let (status, body) = json_of(
        app.post_json("/query", &json!({"database": "shop", "query": text}))
            .send()
            .await
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], json!([]));
    assert_eq!(body["rows"], json!([]));
    assert_eq!(body["rowCount"], 0);
}

#[tokio::test]
async fn unsafe_queries_are_rejected_before_connecting() {
    let app = TestApp::spawn(MockSessionProvider::new()).await.unwrap();

    for query in [
        "DELETE FROM users",
        "  update users set name = 'x'",
        "SHOW TABLES",
        "SELECT * FROM users; DROP TABLE users",
        "SELECT settings FROM prefs",
        "SELECT created_at FROM orders",
        "",
    ] {
        let (status, body) = json_of(
            app.post_json("/query", &json!({"database": "shop", "query": query}))
                .send()
                .await
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query:?}");
        assert_eq!(body, json!({"error": UNSAFE}), "{query:?}");
    }
    assert_eq!(app.provider.connect_attempts(), 0);
}

#[tokio::test]
async fn missing_parameters_are_rejected() {
    let app = TestApp::spawn(MockSessionProvider::new()).await.unwrap();

    for payload in [
        json!({}),
        json!({"database": "shop"}),
        json!({"query": "SELECT 1"}),
        json!({"database": null, "query": "SELECT 1"}),
        json!({"database": "`;--", "query": "SELECT 1"}),
        json!({"database": ["shop"], "query": "SELECT 1"}),
    ] {
        let (status, body) = json_of(app.post_json("/query", &payload).send().await.unwrap())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body, json!({"error": REQUIRED}), "{payload}");
    }
    assert_eq!(app.provider.connect_attempts(), 0);
}

#[tokio::test]
async fn unreadable_body_is_a_missing_parameter() {
    let app = TestApp::spawn(MockSessionProvider::new()).await.unwrap();

    let response = app
        .client
        .post(app.url("/query"))
        .bearer_auth(common::TEST_API_KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let (status, body) = json_of(response).await.unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": REQUIRED}));
}

#[tokio::test]
async fn engine_errors_are_returned_verbatim() {
    let text = "SELECT * FROM missing_table";
    let provider = MockSessionProvider::new()
        .with_error(text, "Table 'shop.missing_table' doesn't exist");
    let app = TestApp::spawn(provider).await.unwrap();

    let (status, body) = json_of(
        app.post_json("/query", &json!({"database": "shop", "query": text}))
            .send()
            .await
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Table 'shop.missing_table' doesn't exist"})
    );
    assert_eq!(app.provider.opened(), 1);
    assert_eq!(app.provider.closed(), 1);
}

#[tokio::test]
async fn connection_failure_hides_details() {
    let provider = MockSessionProvider::new().failing_connect("Access denied for user 'ro'");
    let app = TestApp::spawn(provider).await.unwrap();

    let (status, body) = json_of(
        app.post_json("/query", &json!({"database": "shop", "query": "SELECT 1"}))
            .send()
            .await
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Database connection failed"}));
}

#[tokio::test]
async fn slow_queries_hit_the_configured_deadline() {
    let provider = MockSessionProvider::new().with_delay(Duration::from_millis(300));
    let config = AppConfig {
        api_key: common::TEST_API_KEY.to_string(),
        query_timeout_ms: Some(25),
        ..Default::default()
    };
    let app = TestApp::spawn_with_config(provider, config).await.unwrap();

    let (status, body) = json_of(
        app.post_json("/query", &json!({"database": "shop", "query": "SELECT SLEEP(5)"}))
            .send()
            .await
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["error"].as_str().unwrap().contains("25 ms"), "{body}");
    assert_eq!(app.provider.opened(), 1);
    assert_eq!(app.provider.closed(), 1);
}

#[tokio::test]
async fn every_endpoint_closes_what_it_opens() {
    let app = TestApp::spawn(
        MockSessionProvider::new().with_reply(
            "SELECT COUNT(*) FROM `orders`",
            row_set(&["COUNT(*)"], vec![vec![json!(0)]]),
        ),
    )
    .await
    .unwrap();

    app.get("/databases").send().await.unwrap();
    app.get("/tables?database=shop").send().await.unwrap();
    app.get("/schema?database=shop&table=orders")
        .send()
        .await
        .unwrap();
    app.get("/data?database=shop&table=orders")
        .send()
        .await
        .unwrap();
    app.post_json("/query", &json!({"database": "shop", "query": "SELECT 1"}))
        .send()
        .await
        .unwrap();
    app.post_json("/query", &json!({"database": "shop", "query": "DROP TABLE x"}))
        .send()
        .await
        .unwrap();

    assert_eq!(app.provider.opened(), 5);
    assert_eq!(app.provider.closed(), 5);
}
