//! Swingforge simulation engine server.
//!
//! Starts the HTTP server with the health, metrics, read and trigger
//! endpoints. Batch and scan runs only happen when triggered through
//! the authenticated endpoints; there is no internal scheduler loop.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::info;

use swingforge::config;
use swingforge::core::http::{start_server, AppState, HealthStatus};
use swingforge::db::{PgStore, SimStore};
use swingforge::logging::init_logging;
use swingforge::metrics::Metrics;
use swingforge::models::catalog::builtin_strategies;
use swingforge::services::finnhub::FinnhubProvider;
use swingforge::signals::ScanConfig;
use swingforge::trading::scheduler::BatchConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    init_logging();

    let environment = config::get_environment();
    let port = config::get_port();
    info!(environment = %environment, port = port, "starting swingforge engine");

    let metrics = Arc::new(Metrics::new()?);

    let store = PgStore::new().await?;
    metrics.database_connected.set(1.0);

    let catalog = builtin_strategies();
    store.seed_strategies(&catalog).await?;
    info!(strategies = catalog.len(), "strategy catalog seeded");

    let provider = FinnhubProvider::from_env();

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time: Arc::new(Instant::now()),
        store: Arc::new(store),
        provider: Arc::new(provider),
        trigger_secret: config::get_trigger_secret(),
        batch_config: BatchConfig::from_env(),
        scan_config: ScanConfig::from_env(),
    };

    if state.trigger_secret.is_none() {
        tracing::warn!("TRIGGER_SECRET not set, trigger endpoints will refuse requests");
    }

    start_server(state, port).await
}
