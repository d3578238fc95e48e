//! POST /operator/sessions/increment, POST /operator/sessions/decrement Contract Tests

use crate::support::{
    http::{get_json, post_json},
    pool::create_test_app,
};
use axum::http::StatusCode;
use serde_json::{json, Value};

const OP_A: &str = "11111111-1111-4111-8111-111111111111";

async fn active_sessions(app: &axum::Router) -> Value {
    let (_, body) = get_json(app, "/operator/list").await;
    body["operators"][0]["active_sessions"].clone()
}

#[tokio::test]
async fn increment_then_decrement_restores_count() {
    let (app, manager, _) = create_test_app().await;
    manager
        .declare_status(OP_A.parse().unwrap(), true, 5)
        .await
        .unwrap();

    let (status, body) = post_json(
        &app,
        "/operator/sessions/increment",
        json!({"operator_id": OP_A}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
    assert_eq!(active_sessions(&app).await, 1);

    let (status, _) = post_json(
        &app,
        "/operator/sessions/decrement",
        json!({"user_id": OP_A}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active_sessions(&app).await, 0);
}

#[tokio::test]
async fn decrement_at_zero_stays_zero() {
    let (app, manager, _) = create_test_app().await;
    manager
        .declare_status(OP_A.parse().unwrap(), true, 5)
        .await
        .unwrap();

    for _ in 0..3 {
        let (status, _) = post_json(
            &app,
            "/operator/sessions/decrement",
            json!({"operator_id": OP_A}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(active_sessions(&app).await, 0);
}

#[tokio::test]
async fn session_updates_on_unknown_operator_are_silent() {
    let (app, _, _) = create_test_app().await;

    for uri in [
        "/operator/sessions/increment",
        "/operator/sessions/decrement",
    ] {
        let (status, body) = post_json(&app, uri, json!({"operator_id": OP_A})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    let (_, body) = get_json(&app, "/operator/stats").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn session_updates_reject_malformed_id() {
    let (app, _, _) = create_test_app().await;

    let (status, body) = post_json(
        &app,
        "/operator/sessions/increment",
        json!({"operator_id": "zzz"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid operator_id");
}
