//! インメモリのオペレーターストア
//!
//! プロセス内で完結する`OperatorStore`実装。テストと`serve --ephemeral`で使う。
//! 順序はSQLite実装と同じく`operator_id`昇順。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::common::error::PoolResult;
use crate::db::traits::OperatorStore;
use crate::types::operator::{OperatorId, OperatorRecord};

/// インメモリストア
#[derive(Debug, Clone, Default)]
pub struct MemoryOperatorStore {
    records: Arc<RwLock<BTreeMap<OperatorId, OperatorRecord>>>,
}

impl MemoryOperatorStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// IDでレコードを取得
    pub async fn get(&self, operator_id: OperatorId) -> Option<OperatorRecord> {
        self.records.read().await.get(&operator_id).cloned()
    }
}

#[async_trait]
impl OperatorStore for MemoryOperatorStore {
    async fn upsert_status(
        &self,
        operator_id: OperatorId,
        available: bool,
        max_sessions: u32,
    ) -> PoolResult<()> {
        let initial = OperatorRecord::new(operator_id, available, i64::from(max_sessions));
        let mut records = self.records.write().await;
        let record = records.entry(operator_id).or_insert(initial);
        record.available = available;
        record.max_sessions = max_sessions.max(1);
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn set_available(&self, operator_id: OperatorId, available: bool) -> PoolResult<()> {
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(&operator_id) {
            record.available = available;
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn find_eligible(&self) -> PoolResult<Vec<OperatorRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.is_eligible())
            .cloned()
            .collect())
    }

    async fn increment_active(&self, operator_id: OperatorId) -> PoolResult<()> {
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(&operator_id) {
            record.active_sessions = record.active_sessions.saturating_add(1);
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn decrement_active_if_positive(&self, operator_id: OperatorId) -> PoolResult<()> {
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(&operator_id) {
            if record.active_sessions > 0 {
                record.active_sessions -= 1;
                record.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn try_reserve(&self, operator_id: OperatorId) -> PoolResult<bool> {
        let mut records = self.records.write().await;
        match records.get_mut(&operator_id) {
            Some(record) if record.is_eligible() => {
                record.active_sessions += 1;
                record.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_available(&self) -> PoolResult<u64> {
        let records = self.records.read().await;
        Ok(records.values().filter(|r| r.available).count() as u64)
    }

    async fn count_all(&self) -> PoolResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn list_all(&self) -> PoolResult<Vec<OperatorRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn ping(&self) -> PoolResult<()> {
        Ok(())
    }
}
