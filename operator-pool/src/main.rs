//! Operator Pool Server Entry Point

use clap::Parser;
use operator_pool::cli::{migrate, seed, serve, Cli, Commands};
use operator_pool::config::{self, PoolConfig, ServerConfig};
use operator_pool::{api, logging};
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 旧変数名の警告を出せるよう、ログ初期化後に設定を読み込む
    logging::init(&config::log_level()).expect("failed to initialize logging");
    let env_config = ServerConfig::from_env();

    match cli.command {
        Some(Commands::Migrate(args)) => {
            let url = args.database_url.unwrap_or(env_config.database_url);
            let pool_config = PoolConfig::from_env();
            if let Err(e) = migrate::execute(&url, &pool_config).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Seed(args)) => {
            let url = args.database_url.clone().unwrap_or(env_config.database_url);
            let pool_config = PoolConfig::from_env();
            match seed::execute(&args, &url, &pool_config).await {
                Ok(count) => println!("Seeded {} operators", count),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Serve(args)) => {
            run_server(args.apply(env_config), args.ephemeral).await;
        }
        None => {
            // No subcommand - default to serve
            run_server(serve::ServeArgs::default().apply(env_config), false).await;
        }
    }
}

async fn run_server(config: ServerConfig, ephemeral: bool) {
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let pool_config = PoolConfig::from_env();
    info!(
        store_timeout_ms = pool_config.store_timeout.as_millis() as u64,
        ephemeral, "Starting operator pool"
    );

    let state = match serve::build_state(&config, pool_config, ephemeral).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize operator store: {}", e);
            std::process::exit(1);
        }
    };

    let app = api::create_app(state).layer(TimeoutLayer::new(config.request_timeout));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    info!("Operator pool server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!("Server shutdown complete");
}

/// シャットダウンシグナルを待機
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
