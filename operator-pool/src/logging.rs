//! ロギング初期化
//!
//! `RUST_LOG`が設定されていればそれを優先し、なければ設定値のレベルを使う。

use tracing_subscriber::EnvFilter;

/// tracing-subscriberを初期化する
///
/// 2回目以降の呼び出しはエラーを返す（グローバルサブスクライバーは1つだけ）。
pub fn init(level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = build_filter(level);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
