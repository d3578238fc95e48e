use std::sync::Arc;

use axum::Router;
use operator_pool::{
    api,
    balancer::PoolManager,
    config::PoolConfig,
    db::{migrations, MemoryOperatorStore, SqliteOperatorStore},
    AppState,
};
use sqlx::SqlitePool;

/// マイグレーション済みのインメモリSQLiteプールを作成する
pub async fn create_test_db_pool() -> SqlitePool {
    migrations::initialize_database("sqlite::memory:", &PoolConfig::default())
        .await
        .expect("Failed to initialize test database")
}

/// SQLiteストアを使うテスト用アプリ（.oneshot()スタイルのテスト用）
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, PoolManager, SqlitePool) {
    let db_pool = create_test_db_pool().await;
    let manager = PoolManager::new(Arc::new(SqliteOperatorStore::new(db_pool.clone())));
    let app = api::create_app(AppState::new(manager.clone()));
    (app, manager, db_pool)
}

/// インメモリストアを使うテスト用アプリ
#[allow(dead_code)]
pub fn create_memory_app() -> (Router, PoolManager) {
    let manager = PoolManager::new(Arc::new(MemoryOperatorStore::new()));
    let app = api::create_app(AppState::new(manager.clone()));
    (app, manager)
}
