//! 型定義モジュール
//!
//! ドメインエンティティの型定義を提供

/// オペレーター関連の型定義
pub mod operator;

pub use operator::{OperatorId, OperatorRecord, OperatorState, PoolStats, DEFAULT_MAX_SESSIONS};
