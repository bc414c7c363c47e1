//! Integration tests for the HTTP surface

#[path = "test_utils.rs"]
mod test_utils;

use serde_json::Value;

use test_utils::{TestApp, TRIGGER_SECRET};

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApp::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "swingforge-engine");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApp::new().await;
    // Generate at least one tracked request first.
    let _ = app.server.get("/health").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    assert!(body.contains("http_requests_total"));
    assert!(body.contains("http_request_duration_seconds"));
    assert!(body.contains("batch_runs_total"));
    assert!(body.contains("scan_runs_total"));
}

#[tokio::test]
async fn batch_trigger_requires_bearer_secret() {
    let app = TestApp::new().await;

    let response = app.server.post("/api/batch/run").await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .server
        .post("/api/batch/run")
        .add_header("authorization", "Bearer wrong")
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn triggers_refuse_without_configured_secret() {
    let app = TestApp::with_secret(None).await;
    let response = app
        .server
        .post("/api/batch/run")
        .add_header("authorization", format!("Bearer {}", TRIGGER_SECRET))
        .await;
    assert_eq!(response.status_code(), 503);

    let response = app
        .server
        .post("/api/scan/run")
        .add_header("authorization", format!("Bearer {}", TRIGGER_SECRET))
        .await;
    assert_eq!(response.status_code(), 503);
}

#[tokio::test]
async fn batch_trigger_returns_run_summary() {
    let app = TestApp::new().await;
    let response = app
        .server
        .post("/api/batch/run")
        .add_header("authorization", format!("Bearer {}", TRIGGER_SECRET))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["positions_checked"], 0);
    assert_eq!(body["trades_opened"], 0);
    assert_eq!(body["deadline_hit"], false);
    assert!(body["duration_ms"].as_u64().is_some());
}

#[tokio::test]
async fn scan_trigger_returns_run_summary() {
    let app = TestApp::new().await;
    let response = app
        .server
        .post("/api/scan/run")
        .add_header("authorization", format!("Bearer {}", TRIGGER_SECRET))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["symbols_refreshed"], 0);
    assert_eq!(body["signals_upserted"], 0);
}

#[tokio::test]
async fn strategies_endpoint_lists_the_catalog() {
    let app = TestApp::new().await;
    let response = app.server.get("/api/strategies").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let strategies = body.as_array().unwrap();
    assert_eq!(strategies.len(), 8);
    assert!(strategies
        .iter()
        .any(|s| s["key"] == "rsi_mean_reversion"));
}

#[tokio::test]
async fn simulations_endpoint_includes_derived_stats() {
    let app = TestApp::new().await;
    let response = app.server.get("/api/simulations").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let simulations = body.as_array().unwrap();
    assert_eq!(simulations.len(), 8);
    for entry in simulations {
        assert_eq!(entry["simulation"]["current_capital"], 10_000.0);
        assert_eq!(entry["simulation"]["status"], "ACTIVE");
        assert!(entry["win_rate"].as_f64().is_some());
        assert!(entry["profit_factor"].as_f64().is_some());
        assert!(entry["expectancy"].as_f64().is_some());
    }
}

#[tokio::test]
async fn batch_trigger_updates_run_metrics() {
    let app = TestApp::new().await;
    let _ = app
        .server
        .post("/api/batch/run")
        .add_header("authorization", format!("Bearer {}", TRIGGER_SECRET))
        .await;

    let body = app.server.get("/metrics").await.text();
    assert!(body.contains("batch_runs_total 1"));
}
