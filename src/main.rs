use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod catalog;
mod config;
mod dashboard;
mod db;
mod predictor;
mod stats;
mod view;

use config::Config;
use dashboard::AppState;
use db::models::{ClusterInfo, PlayerStats};
use db::Database;
use predictor::HttpPredictor;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    // Seed the store from a JSON snapshot if it is empty and a snapshot was given
    if let Some(path) = &config.seed_data {
        seed_if_empty(&db, path)?;
    }
    info!(
        "Store ready: {} players, {} clusters",
        db.count_players()?,
        db.count_clusters()?
    );

    // Build the prediction client
    let predictor = HttpPredictor::new(&config.predictor_url, config.predictor_timeout_secs)?;
    info!("Prediction endpoint: {}", config.predictor_url);

    // Start the dashboard HTTP server (blocks until shutdown)
    let state = AppState {
        db,
        predictor: Arc::new(predictor),
    };
    let app = dashboard::router(state);
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shape of the seed snapshot file.
#[derive(Deserialize)]
struct SeedData {
    players: Vec<PlayerStats>,
    clusters: Vec<ClusterInfo>,
}

/// Load both collections from a snapshot into an empty store. Rows are owned
/// by the upstream ETL; this runs at most once per database file.
fn seed_if_empty(db: &Database, path: &str) -> Result<()> {
    if db.count_players()? > 0 || db.count_clusters()? > 0 {
        info!("Store already populated, skipping seed file {}", path);
        return Ok(());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path))?;
    let seed: SeedData = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file {}", path))?;

    for player in &seed.players {
        db.insert_player(player)?;
    }
    for cluster in &seed.clusters {
        db.insert_cluster(cluster)?;
    }
    db.record_seeded_at(Utc::now())?;
    info!(
        "Seeded {} players and {} clusters from {}",
        seed.players.len(),
        seed.clusters.len(),
        path
    );
    Ok(())
}
