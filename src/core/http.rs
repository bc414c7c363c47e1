//! HTTP endpoint server using Axum
//!
//! `/health` and `/metrics` are open; the batch and scan triggers are
//! guarded by a shared secret and return structured run summaries.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::db::SimStore;
use crate::metrics::Metrics;
use crate::services::MarketDataProvider;
use crate::signals::{ScanConfig, SignalScanner};
use crate::trading::scheduler::{BatchConfig, BatchRunner};

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub store: Arc<dyn SimStore>,
    pub provider: Arc<dyn MarketDataProvider>,
    pub trigger_secret: Option<String>,
    pub batch_config: BatchConfig,
    pub scan_config: ScanConfig,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "swingforge-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Shared-secret check for the trigger endpoints. An unset secret means
/// triggers refuse outright (503) rather than running unauthenticated.
fn check_trigger_auth(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let Some(secret) = state.trigger_secret.as_deref() else {
        error!("TRIGGER_SECRET not configured, refusing trigger request");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };
    let expected = format!("Bearer {}", secret);
    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if provided != expected {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(())
}

/// Run one time-boxed batch (exits, entries, age-out).
async fn run_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_trigger_auth(&state, &headers)?;

    let started = Instant::now();
    let runner = BatchRunner::new(
        state.store.clone(),
        state.provider.clone(),
        state.batch_config.clone(),
    );
    let summary = runner.run().await;

    state.metrics.batch_runs_total.inc();
    state
        .metrics
        .batch_run_duration_seconds
        .observe(started.elapsed().as_secs_f64());
    state
        .metrics
        .batch_positions_closed_total
        .inc_by(summary.positions_closed as u64);
    state
        .metrics
        .batch_trades_opened_total
        .inc_by(summary.trades_opened as u64);
    state
        .metrics
        .batch_errors_total
        .inc_by(summary.errors.total() as u64);

    Ok(Json(json!(summary)))
}

/// Refresh indicator snapshots and scan for entry signals.
async fn run_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_trigger_auth(&state, &headers)?;

    let scanner = SignalScanner::new(
        state.store.clone(),
        state.provider.clone(),
        state.scan_config.clone(),
    );
    let summary = scanner.run().await;

    state.metrics.scan_runs_total.inc();
    state
        .metrics
        .scan_signals_total
        .inc_by(summary.signals_upserted as u64);

    Ok(Json(json!(summary)))
}

/// List all strategies with their definitions.
async fn list_strategies(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let strategies = state.store.list_strategies().await.map_err(|e| {
        error!(error = %e, "Failed to load strategies");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(json!(strategies)))
}

/// List per-strategy simulations with derived stats.
async fn list_simulations(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let simulations = state.store.list_simulations().await.map_err(|e| {
        error!(error = %e, "Failed to load simulations");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let enriched: Vec<Value> = simulations
        .iter()
        .map(|sim| {
            json!({
                "simulation": sim,
                "win_rate": sim.win_rate(),
                "profit_factor": sim.profit_factor(),
                "expectancy": sim.expectancy(),
            })
        })
        .collect();
    Ok(Json(json!(enriched)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/batch/run", post(run_batch))
        .route("/api/scan/run", post(run_scan))
        .route("/api/strategies", get(list_strategies))
        .route("/api/simulations", get(list_simulations))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
