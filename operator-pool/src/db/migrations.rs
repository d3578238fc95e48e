// データベース初期化、マイグレーション実行とJSONシード読み込み

use crate::common::error::{CommonError, PoolError};
use crate::config::PoolConfig;
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// SQLiteデータベース接続プールを作成してマイグレーションを実行
///
/// 書き込みの期限はSQLite側で守る。ロック待ちは`busy_timeout`、
/// 接続待ちは`acquire_timeout`で打ち切られ、どちらも文を適用せずに失敗する。
///
/// # Arguments
/// * `database_url` - データベースURL（例: "sqlite:data/operator_pool.db"）
/// * `config` - `store_timeout`をロック待ちと接続待ちの上限に使う
///
/// # Returns
/// * `Ok(SqlitePool)` - 初期化済みデータベースプール
/// * `Err(PoolError)` - 初期化失敗
pub async fn initialize_database(
    database_url: &str,
    config: &PoolConfig,
) -> Result<SqlitePool, PoolError> {
    ensure_parent_dir(database_url)?;

    let connect_options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| PoolError::Store(format!("Invalid database url: {}", e)))?
        .create_if_missing(true)
        .busy_timeout(config.store_timeout);

    let pool = SqlitePoolOptions::new()
        .acquire_timeout(config.store_timeout)
        .connect_with(connect_options)
        .await
        .map_err(|e| PoolError::Store(format!("Failed to connect to database: {}", e)))?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// マイグレーションを実行（sqlx::migrate!マクロを使用）
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), PoolError> {
    tracing::info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| PoolError::Store(format!("Failed to run migrations: {}", e)))?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// SQLiteファイルの親ディレクトリを作成する
///
/// `sqlite::memory:` のような特殊指定はスキップする。
fn ensure_parent_dir(database_url: &str) -> Result<(), PoolError> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    if path.starts_with(':') {
        return Ok(());
    }

    // `sqlite://` 形式に備えてスラッシュを除去し、クエリ部分を除外
    let normalized = path.trim_start_matches("//");
    let path_without_params = normalized.split('?').next().unwrap_or(normalized);
    if let Some(parent) = Path::new(path_without_params).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PoolError::Store(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// シードファイルの1エントリ
#[derive(Debug, Clone, Deserialize)]
pub struct SeedOperator {
    /// オペレーターID（旧フィールド名 `user_id` も受け付ける）
    #[serde(alias = "user_id")]
    pub operator_id: String,
    /// 受付可否
    #[serde(default)]
    pub available: bool,
    /// 同時セッション上限（省略時はデフォルト）
    #[serde(default)]
    pub max_sessions: Option<i32>,
}

/// JSONファイルからシードデータを読み込む
///
/// ファイルは `SeedOperator` の配列。存在しない場合はエラー。
pub fn load_seed_file(json_path: &Path) -> Result<Vec<SeedOperator>, PoolError> {
    let raw = std::fs::read_to_string(json_path).map_err(|e| {
        CommonError::Config(format!("Failed to read {}: {}", json_path.display(), e))
    })?;
    let operators: Vec<SeedOperator> = serde_json::from_str(&raw).map_err(CommonError::from)?;
    tracing::info!(
        count = operators.len(),
        "Loaded seed operators from {}",
        json_path.display()
    );
    Ok(operators)
}
