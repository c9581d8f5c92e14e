//! starboard-api - Standings dashboard service
//!
//! Fetches the private leaderboard feed, computes ranked standings, and
//! serves them as JSON plus a small HTML dashboard.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use starboard_api::{build_router, AppState};
use starboard_common::cache::StandingsCache;
use starboard_common::config::Config;
use starboard_common::feed::HttpFeedClient;

/// Command-line arguments for starboard-api
#[derive(Parser, Debug)]
#[command(name = "starboard-api")]
#[command(about = "Leaderboard standings dashboard service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "STARBOARD_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "starboard_api=debug,starboard_common=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting starboard-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = Config::load().context("Failed to load configuration")?;
    info!("Board id: {}", config.board_id);
    info!("Cache directory: {}", config.cache_dir.display());

    let feed = HttpFeedClient::new(&config).context("Failed to create feed client")?;
    let cache = Arc::new(StandingsCache::new(&config, Box::new(feed)));

    let state = AppState::new(cache);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("Failed to bind port {}", args.port))?;
    info!("starboard-api listening on http://0.0.0.0:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
