//! Fakenodo - Main entry point

use anyhow::Result;
use clap::Parser;
use pixelhub_common::logging::{init_logging, LogConfig, LogLevel};
use pixelhub_common::shutdown::shutdown_signal;
use std::net::SocketAddr;
use tracing::info;

use fakenodo::{app, config::Config, DepositionStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let level = if config.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::builder()
        .level(level)
        .log_file_prefix("fakenodo")
        .filter_directives("fakenodo=debug,tower_http=debug")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let store = if config.seed {
        info!("Seeding store with sample depositions");
        DepositionStore::with_seed_data()
    } else {
        DepositionStore::new()
    };

    let addr: SocketAddr = config.bind_address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Fakenodo listening on {}", addr);

    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
        .await?;

    info!("Fakenodo shut down gracefully");
    Ok(())
}
