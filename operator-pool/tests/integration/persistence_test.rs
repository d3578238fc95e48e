//! 再起動をまたいだ永続化（カーソルは永続化されない）

use std::sync::Arc;

use operator_pool::balancer::PoolManager;
use operator_pool::config::PoolConfig;
use operator_pool::db::{migrations::initialize_database, SqliteOperatorStore};
use operator_pool::types::OperatorId;

#[tokio::test]
async fn records_survive_reopen_and_cursor_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite:{}",
        dir.path().join("data").join("pool.db").display()
    );
    let config = PoolConfig::default();
    let a: OperatorId = "11111111-1111-4111-8111-111111111111".parse().unwrap();
    let b: OperatorId = "22222222-2222-4222-8222-222222222222".parse().unwrap();

    {
        let pool = initialize_database(&url, &config).await.unwrap();
        let manager = PoolManager::new(Arc::new(SqliteOperatorStore::new(pool.clone())));
        manager.declare_status(a, true, 0).await.unwrap();
        manager.declare_status(b, true, 3).await.unwrap();
        manager.increment_sessions(b).await.unwrap();
        assert_eq!(manager.next().await.unwrap(), a);
        assert_eq!(manager.cursor(), 1);
        pool.close().await;
    }

    let pool = initialize_database(&url, &config).await.unwrap();
    let manager = PoolManager::new(Arc::new(SqliteOperatorStore::new(pool)));
    assert_eq!(manager.cursor(), 0);
    assert_eq!(manager.next().await.unwrap(), a);

    let records = manager.list_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].max_sessions, 5);
    assert_eq!(records[1].active_sessions, 1);
    assert_eq!(records[1].max_sessions, 3);
}
