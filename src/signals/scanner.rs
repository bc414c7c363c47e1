//! Snapshot refresh and entry scanning.
//!
//! One scan tick: pull daily candles for the watchlist, recompute each
//! symbol's shared indicator snapshot, then evaluate every active
//! strategy's entry conditions against every fresh snapshot and upsert
//! qualifying signals. Symbols without a fresh snapshot are counted and
//! skipped, never treated as errors.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration as ChronoDuration, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::conditions;
use crate::config;
use crate::db::SimStore;
use crate::indicators::snapshot::{compute_snapshot, SnapshotConfig};
use crate::models::market::Candle;
use crate::models::signal::Signal;
use crate::models::summary::{ErrorList, ScanSummary, DEFAULT_ERROR_CAP};
use crate::services::MarketDataProvider;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub watchlist: Vec<String>,
    /// Daily-candle lookback pulled per symbol; enough for the SMA(200)
    /// rung with margin for non-trading days.
    pub candle_lookback_days: i64,
    pub fetch_concurrency: usize,
    pub snapshot_max_age_hours: i64,
    pub error_cap: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            watchlist: Vec::new(),
            candle_lookback_days: 300,
            fetch_concurrency: 5,
            snapshot_max_age_hours: 72,
            error_cap: DEFAULT_ERROR_CAP,
        }
    }
}

impl ScanConfig {
    pub fn from_env() -> Self {
        Self {
            watchlist: config::get_watchlist(),
            snapshot_max_age_hours: config::get_snapshot_max_age_hours(),
            fetch_concurrency: config::get_quote_concurrency(),
            ..Default::default()
        }
    }
}

pub struct SignalScanner {
    store: Arc<dyn SimStore>,
    provider: Arc<dyn MarketDataProvider>,
    config: ScanConfig,
    snapshot_config: SnapshotConfig,
}

impl SignalScanner {
    pub fn new(
        store: Arc<dyn SimStore>,
        provider: Arc<dyn MarketDataProvider>,
        config: ScanConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
            snapshot_config: SnapshotConfig::default(),
        }
    }

    /// Refresh snapshots for the watchlist, then scan them for entries.
    pub async fn run(&self) -> ScanSummary {
        let started = Instant::now();
        let mut summary = ScanSummary {
            errors: ErrorList::with_cap(self.config.error_cap),
            ..Default::default()
        };

        self.refresh_snapshots(&mut summary).await;
        self.scan(&mut summary).await;

        summary.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            symbols_refreshed = summary.symbols_refreshed,
            symbols_unavailable = summary.symbols_unavailable,
            snapshots_scanned = summary.snapshots_scanned,
            signals_upserted = summary.signals_upserted,
            errors = summary.errors.total(),
            duration_ms = summary.duration_ms,
            "scan complete"
        );
        summary
    }

    async fn refresh_snapshots(&self, summary: &mut ScanSummary) {
        if self.config.watchlist.is_empty() {
            debug!("empty watchlist, skipping snapshot refresh");
            return;
        }

        let to = Utc::now();
        let from = to - ChronoDuration::days(self.config.candle_lookback_days);

        let fetched: Vec<(String, Vec<Candle>)> = stream::iter(self.config.watchlist.clone())
            .map(|symbol| {
                let provider = self.provider.clone();
                async move {
                    let candles = provider.get_candles(&symbol, from, to, "D").await;
                    (symbol, candles)
                }
            })
            .buffer_unordered(self.config.fetch_concurrency.max(1))
            .collect()
            .await;

        for (symbol, candles) in fetched {
            if candles.is_empty() {
                summary.symbols_unavailable += 1;
                continue;
            }
            let Some(snapshot) = compute_snapshot(&symbol, &candles, &self.snapshot_config) else {
                summary.symbols_unavailable += 1;
                continue;
            };
            match self.store.upsert_snapshot(&snapshot).await {
                Ok(()) => summary.symbols_refreshed += 1,
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "snapshot upsert failed");
                    summary
                        .errors
                        .push(format!("snapshot {} failed: {}", symbol, e));
                }
            }
        }
    }

    async fn scan(&self, summary: &mut ScanSummary) {
        let snapshots = match self.store.list_snapshots().await {
            Ok(s) => s,
            Err(e) => {
                summary.errors.push(format!("list snapshots failed: {}", e));
                return;
            }
        };
        let strategies = match self.store.list_active_strategies().await {
            Ok(s) => s,
            Err(e) => {
                summary.errors.push(format!("list strategies failed: {}", e));
                return;
            }
        };

        let now = Utc::now();
        let max_age = ChronoDuration::hours(self.config.snapshot_max_age_hours);

        for snapshot in snapshots {
            if !snapshot.is_fresh(now, max_age) {
                summary.snapshots_stale_skipped += 1;
                continue;
            }
            summary.snapshots_scanned += 1;

            for strategy in &strategies {
                let evaluation = conditions::evaluate_entry(strategy, &snapshot, snapshot.price);
                if !evaluation.passed {
                    continue;
                }
                debug!(
                    symbol = %snapshot.symbol,
                    strategy = %strategy.key,
                    reasons = ?evaluation.reasons,
                    "entry conditions satisfied"
                );
                let signal = Signal::new(
                    &snapshot.symbol,
                    &strategy.key,
                    snapshot.price,
                    snapshot.clone(),
                );
                match self.store.upsert_signal(&signal).await {
                    Ok(()) => summary.signals_upserted += 1,
                    Err(e) => summary.errors.push(format!(
                        "signal {}/{} failed: {}",
                        snapshot.symbol, strategy.key, e
                    )),
                }
            }
        }
    }
}
