//! ロードバランサーモジュール
//!
//! オペレーターの受付可否と同時セッション数から次の担当者をラウンドロビンで選ぶ。
//!
//! # 一貫性
//!
//! - レコードの真実はストアのみが持ち、このモジュールはキャッシュを持たない。
//! - プロセス内の共有状態はラウンドロビンカーソルだけで、ストア呼び出し中は保持しない。
//! - カーソルは選択が成立したときにだけ進む。
//! - セッション数の更新はストア側の条件付き単一更新に任せる。
//!
//! 巡回順はストアの返却順（`operator_id`昇順）に従う。対象集合が呼び出し間で
//! 変化した場合の公平性はベストエフォート。

use crate::common::error::{PoolError, PoolResult};
use crate::config::PoolConfig;
use crate::db::traits::OperatorStore;
use crate::types::operator::{normalize_max_sessions, OperatorId, OperatorRecord, PoolStats};
use std::future::Future;
use std::sync::{
    atomic::{AtomicUsize, Ordering as AtomicOrdering},
    Arc,
};
use tracing::debug;

/// カーソル値と対象集合のサイズから選択位置を求める
///
/// 対象集合が空なら`None`。
pub fn rotation_index(cursor: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(cursor % len)
    }
}

/// オペレータープールマネージャー
///
/// 複数のリクエストハンドラーから並行に呼ばれる前提。`Clone`は状態を共有する。
#[derive(Clone)]
pub struct PoolManager {
    store: Arc<dyn OperatorStore>,
    round_robin: Arc<AtomicUsize>,
    config: PoolConfig,
}

impl PoolManager {
    /// デフォルト設定でマネージャーを作成
    pub fn new(store: Arc<dyn OperatorStore>) -> Self {
        Self::with_config(store, PoolConfig::default())
    }

    /// 設定を指定してマネージャーを作成
    pub fn with_config(store: Arc<dyn OperatorStore>, config: PoolConfig) -> Self {
        Self {
            store,
            round_robin: Arc::new(AtomicUsize::new(0)),
            config,
        }
    }

    /// 現在のカーソル値
    pub fn cursor(&self) -> usize {
        self.round_robin.load(AtomicOrdering::SeqCst)
    }

    /// 読み取り専用のストア呼び出しに期限を付ける
    ///
    /// 期限切れの場合、futureはその場でdropされ`PoolError::Timeout`になる。
    /// 書き込みには使わない。dropしても文はストア側で実行され続けるため、
    /// 書き込みの期限はストア自身（SQLiteの`busy_timeout`など）が守る。
    async fn read<T, F>(&self, operation: &'static str, fut: F) -> PoolResult<T>
    where
        F: Future<Output = PoolResult<T>>,
    {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(PoolError::Timeout(format!(
                "{} did not complete within {:?}",
                operation, self.config.store_timeout
            ))),
        }
    }

    /// 受付可否と同時セッション上限を宣言する
    ///
    /// レコードがなければ作成する。`max_sessions`が0以下ならデフォルト（5）を使う。
    /// `active_sessions`は変更しない。
    pub async fn declare_status(
        &self,
        operator_id: OperatorId,
        available: bool,
        max_sessions: i64,
    ) -> PoolResult<()> {
        let max_sessions = normalize_max_sessions(max_sessions);
        self.store
            .upsert_status(operator_id, available, max_sessions)
            .await?;
        debug!(%operator_id, available, max_sessions, "Declared operator status");
        Ok(())
    }

    /// 受付可否のみを切り替える（レコードがなければ何もしない）
    pub async fn set_availability(
        &self,
        operator_id: OperatorId,
        available: bool,
    ) -> PoolResult<()> {
        self.store.set_available(operator_id, available).await?;
        debug!(%operator_id, available, "Updated operator availability");
        Ok(())
    }

    /// セッション数を1増やす
    ///
    /// 容量チェックは行わない。呼び出し側が`next()`で選択済みであること。
    pub async fn increment_sessions(&self, operator_id: OperatorId) -> PoolResult<()> {
        self.store.increment_active(operator_id).await?;
        debug!(%operator_id, "Incremented active sessions");
        Ok(())
    }

    /// セッション数を1減らす（0のときは何もしない）
    pub async fn decrement_sessions(&self, operator_id: OperatorId) -> PoolResult<()> {
        self.store.decrement_active_if_positive(operator_id).await?;
        debug!(%operator_id, "Decremented active sessions");
        Ok(())
    }

    /// 次のオペレーターをラウンドロビンで選択する
    ///
    /// 対象集合が空なら`NoOperatorAvailable`を返し、カーソルは進めない。
    /// 選択だけを行い、セッション枠は確保しない。
    pub async fn next(&self) -> PoolResult<OperatorId> {
        let eligible = self.list_available().await?;
        if eligible.is_empty() {
            return Err(PoolError::NoOperatorAvailable);
        }

        let cursor = self.round_robin.fetch_add(1, AtomicOrdering::SeqCst);
        let position = rotation_index(cursor, eligible.len()).unwrap_or(0);
        let selected = eligible[position].operator_id;

        debug!(
            operator_id = %selected,
            position,
            eligible = eligible.len(),
            "Selected next operator"
        );
        Ok(selected)
    }

    /// 次のオペレーターを選択し、同時にセッション枠を確保する
    ///
    /// `next()`と同じ位置から巡回順に`try_reserve`を試し、他の呼び出しに
    /// 先を越された候補は飛ばす。試行は取得した対象集合のサイズまで。
    /// 対象集合が空でなければカーソルは1回進む。
    pub async fn reserve_next(&self) -> PoolResult<OperatorId> {
        let eligible = self.list_available().await?;
        if eligible.is_empty() {
            return Err(PoolError::NoOperatorAvailable);
        }

        let cursor = self.round_robin.fetch_add(1, AtomicOrdering::SeqCst);
        let len = eligible.len();
        let start = rotation_index(cursor, len).unwrap_or(0);

        for offset in 0..len {
            let candidate = eligible[(start + offset) % len].operator_id;
            if self.store.try_reserve(candidate).await? {
                debug!(
                    operator_id = %candidate,
                    position = (start + offset) % len,
                    skipped = offset,
                    "Reserved next operator"
                );
                return Ok(candidate);
            }
        }

        debug!(eligible = len, "All candidates were taken before reservation");
        Err(PoolError::NoOperatorAvailable)
    }

    /// 集計値を取得する
    ///
    /// `available`を先に数えるため、レコードが削除されない限り
    /// `available <= total`が保たれる。スナップショット一貫性はない。
    pub async fn stats(&self) -> PoolResult<PoolStats> {
        let available = self
            .read("count_available", self.store.count_available())
            .await?;
        let total = self.read("count_all", self.store.count_all()).await?;
        Ok(PoolStats { available, total })
    }

    /// 全オペレーターを取得する
    pub async fn list_all(&self) -> PoolResult<Vec<OperatorRecord>> {
        self.read("list_all", self.store.list_all()).await
    }

    /// 現在の選択対象を取得する
    pub async fn list_available(&self) -> PoolResult<Vec<OperatorRecord>> {
        self.read("find_eligible", self.store.find_eligible()).await
    }

    /// ストアの疎通確認
    pub async fn ping(&self) -> PoolResult<()> {
        self.read("ping", self.store.ping()).await
    }
}
