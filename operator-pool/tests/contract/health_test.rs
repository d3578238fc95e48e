//! GET /health, GET /ready Contract Tests

use crate::support::{
    http::get_json,
    pool::{create_memory_app, create_test_app},
};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = create_memory_app();

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn ready_when_store_is_reachable() {
    let (app, _, _) = create_test_app().await;

    let (status, body) = get_json(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ready"}));
}

#[tokio::test]
async fn ready_fails_after_store_is_closed() {
    let (app, _, db_pool) = create_test_app().await;
    db_pool.close().await;

    let (status, body) = get_json(&app, "/ready").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Store error"}));

    // ストア障害でも /health はプロセス生存を返す
    let (status, _) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}
