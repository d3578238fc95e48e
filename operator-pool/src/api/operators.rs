//! オペレーター管理API
//!
//! リクエストボディは型付き構造体で受け取り、IDの解析まで済ませてから
//! `PoolManager`を呼び出す。

use super::error::AppError;
use crate::types::operator::{OperatorId, OperatorRecord, OperatorState};
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ステータス宣言リクエスト
#[derive(Debug, Deserialize)]
pub struct DeclareStatusRequest {
    /// オペレーターID（旧フィールド名 `user_id` も受け付ける）
    #[serde(alias = "user_id")]
    pub operator_id: String,
    /// 受付可否
    pub available: bool,
    /// 同時セッション上限（省略または0以下でデフォルト）
    #[serde(default)]
    pub max_sessions: Option<i32>,
}

/// 受付可否切り替えリクエスト
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    /// オペレーターID
    #[serde(alias = "user_id")]
    pub operator_id: String,
    /// 受付可否
    pub available: bool,
}

/// セッション数更新リクエスト
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// オペレーターID
    #[serde(alias = "user_id")]
    pub operator_id: String,
}

/// 成功レスポンス
#[derive(Debug, Serialize)]
pub struct OkResponse {
    /// 常にtrue
    pub ok: bool,
}

impl OkResponse {
    fn new() -> Json<Self> {
        Json(Self { ok: true })
    }
}

/// 選択結果レスポンス
#[derive(Debug, Serialize)]
pub struct NextResponse {
    /// 選択されたオペレーター
    pub operator_id: OperatorId,
}

/// 集計レスポンス
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// 受付可能を宣言しているオペレーター数
    pub available: u64,
    /// 全オペレーター数
    pub total: u64,
}

/// オペレーターレスポンス
#[derive(Debug, Serialize)]
pub struct OperatorResponse {
    /// オペレーターID
    pub operator_id: OperatorId,
    /// 旧フィールド名（`operator_id`と同じ値）
    pub user_id: OperatorId,
    /// 受付可否
    pub available: bool,
    /// 現在の同時セッション数
    pub active_sessions: u32,
    /// 同時セッション上限
    pub max_sessions: u32,
    /// 状態
    pub state: OperatorState,
    /// 最終更新時刻
    pub updated_at: DateTime<Utc>,
}

impl From<OperatorRecord> for OperatorResponse {
    fn from(record: OperatorRecord) -> Self {
        Self {
            state: record.state(),
            operator_id: record.operator_id,
            user_id: record.operator_id,
            available: record.available,
            active_sessions: record.active_sessions,
            max_sessions: record.max_sessions,
            updated_at: record.updated_at,
        }
    }
}

/// オペレーター一覧レスポンス
#[derive(Debug, Serialize)]
pub struct ListOperatorsResponse {
    /// オペレーター一覧
    pub operators: Vec<OperatorResponse>,
    /// 件数
    pub total: usize,
}

impl From<Vec<OperatorRecord>> for ListOperatorsResponse {
    fn from(records: Vec<OperatorRecord>) -> Self {
        let operators: Vec<OperatorResponse> =
            records.into_iter().map(OperatorResponse::from).collect();
        Self {
            total: operators.len(),
            operators,
        }
    }
}

/// POST /operator/status - 受付可否と上限を宣言
pub async fn declare_status(
    State(state): State<AppState>,
    payload: Result<Json<DeclareStatusRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(req) = payload?;
    let operator_id: OperatorId = req.operator_id.parse()?;
    let max_sessions = req.max_sessions.map(i64::from).unwrap_or(0);

    state
        .pool_manager
        .declare_status(operator_id, req.available, max_sessions)
        .await?;
    Ok(OkResponse::new())
}

/// POST /operator/availability - 受付可否のみ切り替え
pub async fn set_availability(
    State(state): State<AppState>,
    payload: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(req) = payload?;
    let operator_id: OperatorId = req.operator_id.parse()?;

    state
        .pool_manager
        .set_availability(operator_id, req.available)
        .await?;
    Ok(OkResponse::new())
}

/// POST /operator/sessions/increment - セッション開始
pub async fn increment_sessions(
    State(state): State<AppState>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(req) = payload?;
    let operator_id: OperatorId = req.operator_id.parse()?;

    state.pool_manager.increment_sessions(operator_id).await?;
    Ok(OkResponse::new())
}

/// POST /operator/sessions/decrement - セッション終了
pub async fn decrement_sessions(
    State(state): State<AppState>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(req) = payload?;
    let operator_id: OperatorId = req.operator_id.parse()?;

    state.pool_manager.decrement_sessions(operator_id).await?;
    Ok(OkResponse::new())
}

/// GET /operator/next - 次のオペレーターを選択
pub async fn next_operator(State(state): State<AppState>) -> Result<Json<NextResponse>, AppError> {
    let operator_id = state.pool_manager.next().await?;
    Ok(Json(NextResponse { operator_id }))
}

/// POST /operator/reserve - 次のオペレーターを選択してセッション枠を確保
pub async fn reserve_operator(
    State(state): State<AppState>,
) -> Result<Json<NextResponse>, AppError> {
    let operator_id = state.pool_manager.reserve_next().await?;
    Ok(Json(NextResponse { operator_id }))
}

/// GET /operator/stats - 集計
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.pool_manager.stats().await?;
    Ok(Json(StatsResponse {
        available: stats.available,
        total: stats.total,
    }))
}

/// GET /operator/list - 全オペレーター
pub async fn list_operators(
    State(state): State<AppState>,
) -> Result<Json<ListOperatorsResponse>, AppError> {
    let records = state.pool_manager.list_all().await?;
    Ok(Json(records.into()))
}

/// GET /operator/available - 現在の選択対象
pub async fn list_available_operators(
    State(state): State<AppState>,
) -> Result<Json<ListOperatorsResponse>, AppError> {
    let records = state.pool_manager.list_available().await?;
    Ok(Json(records.into()))
}
