//! ヘルスチェック / レディネス

use super::error::AppError;
use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// GET /health - プロセスの生存確認（ストアには触れない）
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /ready - ストアへの疎通確認
pub async fn ready(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.pool_manager.ping().await?;
    Ok(Json(json!({ "status": "ready" })))
}
