//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `PoolError`は`status_code()`と`external_message()`を提供し、
//! トランスポート層はこの2つだけでレスポンスを組み立てる。

use axum::http::StatusCode;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// オペレータープールのエラー型
#[derive(Debug, Error)]
pub enum PoolError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// 受付可能なオペレーターが存在しない（想定内の状態）
    #[error("No operator available")]
    NoOperatorAvailable,

    /// 不正なオペレーターID
    #[error("Invalid operator id: {0}")]
    InvalidOperatorId(String),

    /// ストアの読み書き失敗
    #[error("Store error: {0}")]
    Store(String),

    /// ストア呼び出しが期限内に完了しなかった
    #[error("Timeout error: {0}")]
    Timeout(String),
}

impl PoolError {
    /// Returns a safe error message for external clients.
    ///
    /// Store details (paths, SQL, driver messages) stay in server logs;
    /// use `to_string()` for those.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Common(CommonError::Validation(_)) => "invalid body",
            Self::Common(_) => "Request error",
            Self::NoOperatorAvailable => "no operator available",
            Self::InvalidOperatorId(_) => "invalid operator_id",
            Self::Store(_) => "Store error",
            Self::Timeout(_) => "Store timeout",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(_) => StatusCode::BAD_REQUEST,
            Self::NoOperatorAvailable => StatusCode::NOT_FOUND,
            Self::InvalidOperatorId(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// ストア起因のエラーかどうか
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Timeout(_))
    }
}

/// SQLiteの一次エラーコード（拡張コードの下位8ビット）
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// ロック待ちが`busy_timeout`を超えた、または接続取得が期限切れになったか
///
/// どちらも書き込みが適用される前に失敗している。
fn is_store_deadline(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
        _ => false,
    }
}

impl From<sqlx::Error> for PoolError {
    fn from(err: sqlx::Error) -> Self {
        if is_store_deadline(&err) {
            PoolError::Timeout(err.to_string())
        } else {
            PoolError::Store(err.to_string())
        }
    }
}

/// オペレータープールのResult型
pub type PoolResult<T> = Result<T, PoolError>;
