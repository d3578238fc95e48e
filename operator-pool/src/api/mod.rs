//! REST APIハンドラー
//!
//! オペレーター選択・状態管理のHTTPバインディング

/// エラーレスポンス
pub mod error;
/// ヘルスチェック
pub mod health;
/// オペレーター管理API
pub mod operators;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// APIルーターを作成
///
/// リクエスト全体のタイムアウトは呼び出し側（`serve`）で重ねる。
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/operator/status", post(operators::declare_status))
        .route("/operator/availability", post(operators::set_availability))
        .route(
            "/operator/sessions/increment",
            post(operators::increment_sessions),
        )
        .route(
            "/operator/sessions/decrement",
            post(operators::decrement_sessions),
        )
        .route("/operator/next", get(operators::next_operator))
        .route("/operator/reserve", post(operators::reserve_operator))
        .route("/operator/stats", get(operators::stats))
        .route("/operator/list", get(operators::list_operators))
        .route(
            "/operator/available",
            get(operators::list_available_operators),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
