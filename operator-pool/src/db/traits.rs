//! Repository traitパターン定義
//!
//! オペレーターレコードの永続化を抽象化する。
//! `PoolManager`はこのtraitだけに依存し、SQLiteとインメモリ実装を差し替えられる。

use async_trait::async_trait;

use crate::common::error::PoolResult;
use crate::types::operator::{OperatorId, OperatorRecord};

// ---------------------------------------------------------------------------
// OperatorStore
// ---------------------------------------------------------------------------

/// オペレーターレコードのストア
///
/// 一覧系の返却順は`operator_id`昇順。ラウンドロビンの巡回順はこの順序に従う。
/// 各メソッドは単一のアトミックな操作として実装すること。
#[async_trait]
pub trait OperatorStore: Send + Sync {
    /// 受付可否と上限をupsertする（active_sessionsは変更しない）
    async fn upsert_status(
        &self,
        operator_id: OperatorId,
        available: bool,
        max_sessions: u32,
    ) -> PoolResult<()>;

    /// 受付可否のみを更新する（レコードがなければ何もしない）
    async fn set_available(&self, operator_id: OperatorId, available: bool) -> PoolResult<()>;

    /// 選択対象（available かつ active_sessions < max_sessions）の一覧を取得
    async fn find_eligible(&self) -> PoolResult<Vec<OperatorRecord>>;

    /// active_sessionsを1増やす（レコードがなければ何もしない）
    async fn increment_active(&self, operator_id: OperatorId) -> PoolResult<()>;

    /// active_sessionsが正のときだけ1減らす
    async fn decrement_active_if_positive(&self, operator_id: OperatorId) -> PoolResult<()>;

    /// まだ選択対象である場合に限りactive_sessionsを1増やす
    ///
    /// 枠を確保できたら`true`。
    async fn try_reserve(&self, operator_id: OperatorId) -> PoolResult<bool>;

    /// available == true のレコード数
    async fn count_available(&self) -> PoolResult<u64>;

    /// 全レコード数
    async fn count_all(&self) -> PoolResult<u64>;

    /// 全レコードを取得
    async fn list_all(&self) -> PoolResult<Vec<OperatorRecord>>;

    /// ストアへの疎通確認
    async fn ping(&self) -> PoolResult<()>;
}
