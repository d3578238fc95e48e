//! Operator Pool Server
//!
//! オペレーターの受付可否と同時セッション数を管理し、
//! ラウンドロビンで次のオペレーターを選択する

#![warn(missing_docs)]

/// 共通型定義（エラー型）
pub mod common;

/// REST APIハンドラー
pub mod api;

/// オペレーター選択（ラウンドロビン、セッション枠の確保）
pub mod balancer;

/// データベースアクセス
pub mod db;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// CLIインターフェース
pub mod cli;

/// 型定義
pub mod types;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// オペレータープールマネージャー
    pub pool_manager: balancer::PoolManager,
}

impl AppState {
    /// マネージャーから状態を作成
    pub fn new(pool_manager: balancer::PoolManager) -> Self {
        Self { pool_manager }
    }
}
