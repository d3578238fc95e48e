//! 共通定義
//!
//! エラー型などレイヤー横断で使う定義

/// エラー型
pub mod error;
