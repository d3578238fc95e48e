//! migrate サブコマンド
//!
//! スキーマを最新にして終了します。

use crate::common::error::PoolError;
use crate::config::PoolConfig;
use crate::db::migrations;
use clap::Args;

/// migrate サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// SQLite database URL
    #[arg(long, env = "OPPOOL_DATABASE_URL")]
    pub database_url: Option<String>,
}

/// マイグレーションを実行
pub async fn execute(database_url: &str, config: &PoolConfig) -> Result<(), PoolError> {
    let pool = migrations::initialize_database(database_url, config).await?;
    pool.close().await;
    Ok(())
}
