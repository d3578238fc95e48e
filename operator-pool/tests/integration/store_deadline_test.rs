//! ロック待ちで期限切れになった書き込みは適用されない（ファイルベースSQLite）

use std::sync::Arc;
use std::time::Duration;

use operator_pool::balancer::PoolManager;
use operator_pool::common::error::PoolError;
use operator_pool::config::PoolConfig;
use operator_pool::db::{migrations::initialize_database, operators, SqliteOperatorStore};
use operator_pool::types::OperatorId;
use sqlx::{Connection, SqliteConnection};

#[tokio::test]
async fn writes_refused_under_lock_are_not_applied() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("pool.db").display());
    let config = PoolConfig {
        store_timeout: Duration::from_millis(200),
    };
    let pool = initialize_database(&url, &config).await.unwrap();
    let store = Arc::new(SqliteOperatorStore::new(pool.clone()));
    let manager = PoolManager::with_config(store, config);
    let op = OperatorId::generate();
    manager.declare_status(op, true, 1).await.unwrap();

    // 別接続で書き込みロックを保持する
    let mut blocker = SqliteConnection::connect(&url).await.unwrap();
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut blocker)
        .await
        .unwrap();

    let reserved = manager.reserve_next().await;
    assert!(matches!(reserved, Err(PoolError::Timeout(_))));
    let incremented = manager.increment_sessions(op).await;
    assert!(matches!(incremented, Err(PoolError::Timeout(_))));

    sqlx::query("ROLLBACK").execute(&mut blocker).await.unwrap();
    blocker.close().await.unwrap();

    let record = operators::get_operator(&pool, op).await.unwrap().unwrap();
    assert_eq!(record.active_sessions, 0);
    assert_eq!(manager.reserve_next().await.unwrap(), op);
}
