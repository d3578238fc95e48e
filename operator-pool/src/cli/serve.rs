//! serve サブコマンド
//!
//! HTTPサーバーを起動します。

use crate::balancer::PoolManager;
use crate::common::error::PoolError;
use crate::config::{PoolConfig, ServerConfig};
use crate::db::{migrations, MemoryOperatorStore, OperatorStore, SqliteOperatorStore};
use crate::AppState;
use clap::Args;
use std::sync::Arc;

/// serve サブコマンドの引数
///
/// 未指定の項目は環境変数（`ServerConfig::from_env`）の値を使う。
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, env = "OPPOOL_PORT")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long, env = "OPPOOL_HOST")]
    pub host: Option<String>,

    /// SQLite database URL
    #[arg(long, env = "OPPOOL_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep operator state in memory only (nothing is persisted)
    #[arg(long, default_value_t = false)]
    pub ephemeral: bool,
}

impl ServeArgs {
    /// 引数で環境変数由来の設定を上書きする
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        config
    }
}

/// ストアとマネージャーを組み立ててアプリケーション状態を作る
///
/// `ephemeral`が真ならデータベースには接続しない。
pub async fn build_state(
    config: &ServerConfig,
    pool_config: PoolConfig,
    ephemeral: bool,
) -> Result<AppState, PoolError> {
    let store: Arc<dyn OperatorStore> = if ephemeral {
        tracing::warn!("Running with in-memory operator store; state is lost on exit");
        Arc::new(MemoryOperatorStore::new())
    } else {
        let pool = migrations::initialize_database(&config.database_url, &pool_config)
            .await?;
        Arc::new(SqliteOperatorStore::new(pool))
    };

    Ok(AppState::new(PoolManager::with_config(store, pool_config)))
}
