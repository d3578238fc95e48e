//! seed サブコマンド
//!
//! JSONファイルに列挙されたオペレーターを`DeclareStatus`経由で登録します。

use crate::balancer::PoolManager;
use crate::common::error::PoolError;
use crate::config::PoolConfig;
use crate::db::migrations::{self, SeedOperator};
use crate::db::SqliteOperatorStore;
use crate::types::operator::OperatorId;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// seed サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    /// JSON file: array of {operator_id, available, max_sessions}
    #[arg(short, long)]
    pub file: PathBuf,

    /// SQLite database URL
    #[arg(long, env = "OPPOOL_DATABASE_URL")]
    pub database_url: Option<String>,
}

/// シードファイルを読み込んでデータベースに登録する
///
/// 登録した件数を返す。不正なIDを含む場合は何も書き込まずにエラーを返す。
pub async fn execute(
    args: &SeedArgs,
    database_url: &str,
    config: &PoolConfig,
) -> Result<usize, PoolError> {
    let seeds = migrations::load_seed_file(&args.file)?;
    let parsed = parse_seeds(&seeds)?;

    let pool = migrations::initialize_database(database_url, config).await?;
    let manager = PoolManager::with_config(
        Arc::new(SqliteOperatorStore::new(pool.clone())),
        *config,
    );
    declare_all(&manager, &parsed).await?;
    pool.close().await;

    tracing::info!(count = parsed.len(), "Seeded operators");
    Ok(parsed.len())
}

/// 全エントリのIDを先に検証する
fn parse_seeds(seeds: &[SeedOperator]) -> Result<Vec<(OperatorId, bool, i64)>, PoolError> {
    seeds
        .iter()
        .map(|seed| {
            let id: OperatorId = seed.operator_id.parse()?;
            let max_sessions = seed.max_sessions.map(i64::from).unwrap_or(0);
            Ok((id, seed.available, max_sessions))
        })
        .collect()
}

async fn declare_all(
    manager: &PoolManager,
    entries: &[(OperatorId, bool, i64)],
) -> Result<(), PoolError> {
    for &(id, available, max_sessions) in entries {
        manager.declare_status(id, available, max_sessions).await?;
    }
    Ok(())
}
