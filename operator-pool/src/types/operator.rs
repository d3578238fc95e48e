//! オペレーター型定義
//!
//! オペレーターレコードと受付可否の判定規則

use crate::common::error::PoolError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// 同時セッション上限のデフォルト値
pub const DEFAULT_MAX_SESSIONS: u32 = 5;

/// 宣言された同時セッション上限を正規化する
///
/// 0以下はデフォルト（5）に置き換える。
pub fn normalize_max_sessions(declared: i64) -> u32 {
    if declared <= 0 {
        DEFAULT_MAX_SESSIONS
    } else {
        u32::try_from(declared).unwrap_or(u32::MAX)
    }
}

/// オペレーターID
///
/// UUID形式の不透明な識別子。nil UUIDは不正として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(Uuid);

impl OperatorId {
    /// UUIDからIDを作成
    pub fn new(id: Uuid) -> Result<Self, PoolError> {
        if id.is_nil() {
            return Err(PoolError::InvalidOperatorId(id.to_string()));
        }
        Ok(Self(id))
    }

    /// ランダムなIDを生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// 内部のUUIDを返す
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl FromStr for OperatorId {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Uuid::parse_str(s.trim())
            .map_err(|_| PoolError::InvalidOperatorId(s.to_string()))?;
        Self::new(id)
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// オペレーターの状態
///
/// レコードが存在しない状態（unknown）はこの型では表さない。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperatorState {
    /// 受付不可を宣言中
    Unavailable,
    /// 受付可能かつ上限未満
    AvailableUnderCapacity,
    /// 受付可能だが上限に到達
    AvailableAtCapacity,
}

impl OperatorState {
    /// OperatorStateを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::AvailableUnderCapacity => "available_under_capacity",
            Self::AvailableAtCapacity => "available_at_capacity",
        }
    }
}

impl std::fmt::Display for OperatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// オペレーターレコード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatorRecord {
    /// 主キー
    pub operator_id: OperatorId,
    /// オペレーター自身が宣言した受付可否
    pub available: bool,
    /// 現在の同時セッション数
    pub active_sessions: u32,
    /// 同時セッション上限（常に1以上）
    pub max_sessions: u32,
    /// 最終更新時刻（観測用、選択ロジックでは使わない）
    pub updated_at: DateTime<Utc>,
}

impl OperatorRecord {
    /// 新しいレコードを作成（セッション数は0）
    pub fn new(operator_id: OperatorId, available: bool, max_sessions: i64) -> Self {
        Self {
            operator_id,
            available,
            active_sessions: 0,
            max_sessions: normalize_max_sessions(max_sessions),
            updated_at: Utc::now(),
        }
    }

    /// 選択対象かどうか（available かつ active_sessions < max_sessions）
    pub fn is_eligible(&self) -> bool {
        self.available && self.active_sessions < self.max_sessions
    }

    /// 現在の状態
    pub fn state(&self) -> OperatorState {
        match (self.available, self.active_sessions < self.max_sessions) {
            (false, _) => OperatorState::Unavailable,
            (true, true) => OperatorState::AvailableUnderCapacity,
            (true, false) => OperatorState::AvailableAtCapacity,
        }
    }
}

/// プール全体の集計
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// available == true のレコード数（容量状態は問わない）
    pub available: u64,
    /// 全レコード数
    pub total: u64,
}
