//! 同時更新時のセッション数の整合性（ファイルベースSQLite）

use std::sync::Arc;

use operator_pool::balancer::PoolManager;
use operator_pool::config::PoolConfig;
use operator_pool::db::{migrations::initialize_database, SqliteOperatorStore};
use operator_pool::types::OperatorId;

async fn file_backed_manager(dir: &tempfile::TempDir) -> (PoolManager, sqlx::SqlitePool) {
    let url = format!("sqlite:{}", dir.path().join("pool.db").display());
    let pool = initialize_database(&url, &PoolConfig::default())
        .await
        .unwrap();
    let manager = PoolManager::new(Arc::new(SqliteOperatorStore::new(pool.clone())));
    (manager, pool)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let (manager, pool) = file_backed_manager(&dir).await;
    let op = OperatorId::generate();
    manager.declare_status(op, true, 100).await.unwrap();

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.increment_sessions(op).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = operator_pool::db::operators::get_operator(&pool, op)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.active_sessions, 25);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_decrements_never_go_negative() {
    let dir = tempfile::tempdir().unwrap();
    let (manager, pool) = file_backed_manager(&dir).await;
    let op = OperatorId::generate();
    manager.declare_status(op, true, 10).await.unwrap();
    for _ in 0..3 {
        manager.increment_sessions(op).await.unwrap();
    }

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.decrement_sessions(op).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = operator_pool::db::operators::get_operator(&pool, op)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.active_sessions, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_respect_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let (manager, pool) = file_backed_manager(&dir).await;
    let ops: Vec<OperatorId> = (0..3).map(|_| OperatorId::generate()).collect();
    for op in &ops {
        manager.declare_status(*op, true, 2).await.unwrap();
    }

    let handles: Vec<_> = (0..15)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.reserve_next().await })
        })
        .collect();

    let mut reserved = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            reserved += 1;
        }
    }
    assert_eq!(reserved, 6);

    for op in &ops {
        let record = operator_pool::db::operators::get_operator(&pool, *op)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.active_sessions, 2);
    }
}
