//! Prometheus metrics for the HTTP surface and batch/scan runs.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,

    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,

    pub batch_runs_total: IntCounter,
    pub batch_run_duration_seconds: Histogram,
    pub batch_positions_closed_total: IntCounter,
    pub batch_trades_opened_total: IntCounter,
    pub batch_errors_total: IntCounter,

    pub scan_runs_total: IntCounter,
    pub scan_signals_total: IntCounter,

    pub database_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests served")?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently in flight")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;

        let batch_runs_total =
            IntCounter::new("batch_runs_total", "Completed batch scheduler runs")?;
        let batch_run_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "batch_run_duration_seconds",
            "Batch run duration in seconds",
        ))?;
        let batch_positions_closed_total = IntCounter::new(
            "batch_positions_closed_total",
            "Positions closed across all batch runs",
        )?;
        let batch_trades_opened_total = IntCounter::new(
            "batch_trades_opened_total",
            "Trades opened across all batch runs",
        )?;
        let batch_errors_total = IntCounter::new(
            "batch_errors_total",
            "Per-record errors aggregated across batch runs",
        )?;

        let scan_runs_total = IntCounter::new("scan_runs_total", "Completed scan runs")?;
        let scan_signals_total =
            IntCounter::new("scan_signals_total", "Signals upserted across all scan runs")?;

        let database_connected =
            Gauge::new("database_connected", "1 when the store connection is up")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(batch_runs_total.clone()))?;
        registry.register(Box::new(batch_run_duration_seconds.clone()))?;
        registry.register(Box::new(batch_positions_closed_total.clone()))?;
        registry.register(Box::new(batch_trades_opened_total.clone()))?;
        registry.register(Box::new(batch_errors_total.clone()))?;
        registry.register(Box::new(scan_runs_total.clone()))?;
        registry.register(Box::new(scan_signals_total.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
            batch_runs_total,
            batch_run_duration_seconds,
            batch_positions_closed_total,
            batch_trades_opened_total,
            batch_errors_total,
            scan_runs_total,
            scan_signals_total,
            database_connected,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
