//! CLI module for operator-pool
//!
//! Provides command-line interface for the operator pool service.

/// migrate サブコマンド
pub mod migrate;
/// seed サブコマンド
pub mod seed;
/// serve サブコマンド
pub mod serve;

use clap::{Parser, Subcommand};

/// Operator pool - Round-robin selection of available support operators
#[derive(Parser, Debug)]
#[command(name = "operator-pool")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    OPPOOL_HOST                  Bind address (default: 0.0.0.0)
    OPPOOL_PORT                  Listen port (default: 8094)
    OPPOOL_DATABASE_URL          Database URL (default: sqlite:data/operator_pool.db)
    OPPOOL_LOG_LEVEL             Log level (default: info)
    OPPOOL_STORE_TIMEOUT_MS      Deadline of a single store call (default: 5000)
    OPPOOL_REQUEST_TIMEOUT_SECS  Whole-request HTTP timeout (default: 30)

    Legacy names (APP_HOST, APP_PORT, HTTP_PORT, DATABASE_URL, LOG_LEVEL)
    are still read, with a deprecation warning.
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve(serve::ServeArgs),
    /// Apply database migrations and exit
    Migrate(migrate::MigrateArgs),
    /// Declare operators from a JSON file
    Seed(seed::SeedArgs),
}
