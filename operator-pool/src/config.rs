//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to the legacy variable names of the previous service, with warning logs.

use crate::common::error::CommonError;
use std::time::Duration;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use operator_pool::config::get_env_with_fallback;
///
/// let port = get_env_with_fallback("OPPOOL_PORT", "APP_PORT");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// デフォルトの待ち受けポート
pub const DEFAULT_PORT: u16 = 8094;

/// デフォルトのデータベースURL
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/operator_pool.db";

/// ログレベル（`RUST_LOG`未設定時に使用）
///
/// ロギング初期化前に読むため、旧変数名の警告は出力されない。
pub fn log_level() -> String {
    std::env::var("OPPOOL_LOG_LEVEL")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| "info".to_string())
}

/// サーバー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// バインドアドレス
    pub host: String,
    /// 待ち受けポート
    pub port: u16,
    /// データベースURL
    pub database_url: String,
    /// HTTPリクエスト全体のタイムアウト
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Load server configuration from environment variables.
    pub fn from_env() -> Self {
        let host = get_env_with_fallback_or("OPPOOL_HOST", "APP_HOST", "0.0.0.0");
        // 旧サービスは APP_PORT と HTTP_PORT の両方を見ていた
        let port = get_env_with_fallback("OPPOOL_PORT", "APP_PORT")
            .or_else(|| std::env::var("HTTP_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let database_url =
            get_env_with_fallback_or("OPPOOL_DATABASE_URL", "DATABASE_URL", DEFAULT_DATABASE_URL);
        let request_timeout_secs = get_env_with_fallback_parse(
            "OPPOOL_REQUEST_TIMEOUT_SECS",
            "REQUEST_TIMEOUT_SECS",
            30u64,
        );

        Self {
            host,
            port,
            database_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }

    /// バインドアドレス文字列
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 設定値を検証
    pub fn validate(&self) -> Result<(), CommonError> {
        if self.host.trim().is_empty() {
            return Err(CommonError::Config("host is required".to_string()));
        }
        if self.port == 0 {
            return Err(CommonError::Config("port must be non-zero".to_string()));
        }
        if self.database_url.trim().is_empty() {
            return Err(CommonError::Config("database url is required".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(CommonError::Config(
                "request timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// プールマネージャーの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// 読み取りの期限。SQLiteではロック待ちと接続待ちの上限にも使う
    pub store_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_millis(5_000),
        }
    }
}

impl PoolConfig {
    /// Load pool configuration from environment variables.
    pub fn from_env() -> Self {
        let timeout_ms =
            get_env_with_fallback_parse("OPPOOL_STORE_TIMEOUT_MS", "STORE_TIMEOUT_MS", 5_000u64);
        Self {
            store_timeout: Duration::from_millis(timeout_ms.max(1)),
        }
    }
}
