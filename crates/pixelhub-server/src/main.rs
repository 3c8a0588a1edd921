//! PixelHub Server - Main entry point

use anyhow::Result;
use pixelhub_common::logging::{init_logging, LogConfig};
use pixelhub_common::shutdown::shutdown_signal;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

use pixelhub_server::{
    api,
    config::Config,
    db::{self, Repositories},
    features::{zenodo::ZenodoClient, FeatureState},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("pixelhub-server")
        .filter_directives("pixelhub_server=debug,tower_http=debug,sqlx=info")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    info!("Starting PixelHub Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let repos = match &config.database {
        Some(database) => {
            let pool = db::create_pool(database).await?;
            db::run_migrations(&pool).await?;
            Repositories::postgres(pool)
        },
        None => {
            warn!("DATABASE_URL not set, using in-memory repositories; data is lost on restart");
            Repositories::in_memory()
        },
    };

    let zenodo = ZenodoClient::new(&config.zenodo)?;
    info!(url = %zenodo.depositions_url(), "Deposition API client initialized");

    let state = FeatureState::new(repos, zenodo, config.server.site.clone());
    let app = api::create_router(state, &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Duration::from_secs(
            config.server.shutdown_timeout_secs,
        )))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}
