//! オペレーターデータベース操作
//!
//! `operators`テーブルへのクエリと、それを束ねた`SqliteOperatorStore`

use crate::common::error::{PoolError, PoolResult};
use crate::db::traits::OperatorStore;
use crate::types::operator::{OperatorId, OperatorRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// 受付可否と上限をupsert
///
/// 単一の`INSERT ... ON CONFLICT`文で実行するため、途中状態は観測されない。
pub async fn upsert_status(
    pool: &SqlitePool,
    operator_id: OperatorId,
    available: bool,
    max_sessions: u32,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO operators (operator_id, available, active_sessions, max_sessions, updated_at)
        VALUES (?, ?, 0, ?, ?)
        ON CONFLICT(operator_id) DO UPDATE SET
            available = excluded.available,
            max_sessions = excluded.max_sessions,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(operator_id.to_string())
    .bind(available)
    .bind(i64::from(max_sessions))
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// 受付可否のみ更新
pub async fn set_available(
    pool: &SqlitePool,
    operator_id: OperatorId,
    available: bool,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE operators SET available = ?, updated_at = ? WHERE operator_id = ?")
            .bind(available)
            .bind(Utc::now().to_rfc3339())
            .bind(operator_id.to_string())
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// 選択対象のオペレーター一覧を取得
pub async fn find_eligible(pool: &SqlitePool) -> Result<Vec<OperatorRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OperatorRow>(
        r#"
        SELECT operator_id, available, active_sessions, max_sessions, updated_at
        FROM operators
        WHERE available = 1 AND active_sessions < max_sessions
        ORDER BY operator_id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(OperatorRecord::try_from).collect()
}

/// セッション数をインクリメント
pub async fn increment_active(
    pool: &SqlitePool,
    operator_id: OperatorId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE operators
        SET active_sessions = active_sessions + 1, updated_at = ?
        WHERE operator_id = ?
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .bind(operator_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// セッション数をデクリメント（0未満にはしない）
pub async fn decrement_active_if_positive(
    pool: &SqlitePool,
    operator_id: OperatorId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE operators
        SET active_sessions = active_sessions - 1, updated_at = ?
        WHERE operator_id = ? AND active_sessions > 0
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .bind(operator_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// 選択対象のままであればセッション枠を確保
pub async fn try_reserve(pool: &SqlitePool, operator_id: OperatorId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE operators
        SET active_sessions = active_sessions + 1, updated_at = ?
        WHERE operator_id = ? AND available = 1 AND active_sessions < max_sessions
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .bind(operator_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// 受付可能なオペレーター数
pub async fn count_available(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM operators WHERE available = 1")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// 全オペレーター数
pub async fn count_all(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM operators")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// 全オペレーターを取得
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<OperatorRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OperatorRow>(
        r#"
        SELECT operator_id, available, active_sessions, max_sessions, updated_at
        FROM operators
        ORDER BY operator_id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(OperatorRecord::try_from).collect()
}

/// IDでオペレーターを取得
pub async fn get_operator(
    pool: &SqlitePool,
    operator_id: OperatorId,
) -> Result<Option<OperatorRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, OperatorRow>(
        r#"
        SELECT operator_id, available, active_sessions, max_sessions, updated_at
        FROM operators
        WHERE operator_id = ?
        "#,
    )
    .bind(operator_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(OperatorRecord::try_from).transpose()
}

/// SQLiteをバックエンドとするオペレーターストア
#[derive(Clone)]
pub struct SqliteOperatorStore {
    pool: SqlitePool,
}

impl SqliteOperatorStore {
    /// 接続プールからストアを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OperatorStore for SqliteOperatorStore {
    async fn upsert_status(
        &self,
        operator_id: OperatorId,
        available: bool,
        max_sessions: u32,
    ) -> PoolResult<()> {
        upsert_status(&self.pool, operator_id, available, max_sessions).await?;
        Ok(())
    }

    async fn set_available(&self, operator_id: OperatorId, available: bool) -> PoolResult<()> {
        set_available(&self.pool, operator_id, available).await?;
        Ok(())
    }

    async fn find_eligible(&self) -> PoolResult<Vec<OperatorRecord>> {
        Ok(find_eligible(&self.pool).await?)
    }

    async fn increment_active(&self, operator_id: OperatorId) -> PoolResult<()> {
        increment_active(&self.pool, operator_id).await?;
        Ok(())
    }

    async fn decrement_active_if_positive(&self, operator_id: OperatorId) -> PoolResult<()> {
        decrement_active_if_positive(&self.pool, operator_id).await?;
        Ok(())
    }

    async fn try_reserve(&self, operator_id: OperatorId) -> PoolResult<bool> {
        Ok(try_reserve(&self.pool, operator_id).await?)
    }

    async fn count_available(&self) -> PoolResult<u64> {
        let count = count_available(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn count_all(&self) -> PoolResult<u64> {
        let count = count_all(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn list_all(&self) -> PoolResult<Vec<OperatorRecord>> {
        Ok(list_all(&self.pool).await?)
    }

    async fn ping(&self) -> PoolResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| PoolError::Store(format!("ping failed: {}", e)))?;
        Ok(())
    }
}

// --- Internal Row Types ---

#[derive(sqlx::FromRow)]
struct OperatorRow {
    operator_id: String,
    available: i64,
    active_sessions: i64,
    max_sessions: i64,
    updated_at: String,
}

/// 列の値が不正なときのデコードエラー
fn decode_error(column: &str, value: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unexpected value {}", value).into(),
    }
}

impl TryFrom<OperatorRow> for OperatorRecord {
    type Error = sqlx::Error;

    // 壊れた行は補正せずにエラーとして返す
    fn try_from(row: OperatorRow) -> Result<Self, Self::Error> {
        let operator_id = Uuid::parse_str(&row.operator_id)
            .ok()
            .and_then(|uuid| OperatorId::new(uuid).ok())
            .ok_or_else(|| decode_error("operator_id", &row.operator_id))?;

        let available = match row.available {
            0 => false,
            1 => true,
            other => return Err(decode_error("available", other)),
        };
        let active_sessions = u32::try_from(row.active_sessions)
            .map_err(|_| decode_error("active_sessions", row.active_sessions))?;
        let max_sessions = match u32::try_from(row.max_sessions) {
            Ok(v) if v >= 1 => v,
            _ => return Err(decode_error("max_sessions", row.max_sessions)),
        };
        let updated_at = DateTime::parse_from_rfc3339(&row.updated_at)
            .map_err(|_| decode_error("updated_at", &row.updated_at))?
            .with_timezone(&Utc);

        Ok(OperatorRecord {
            operator_id,
            available,
            active_sessions,
            max_sessions,
            updated_at,
        })
    }
}
