//! Integration tests for the snapshot refresh and signal scan

#[path = "test_utils.rs"]
mod test_utils;

use std::sync::Arc;

use chrono::{Duration, Utc};

use swingforge::db::SimStore;
use swingforge::services::StaticProvider;
use swingforge::signals::{ScanConfig, SignalScanner};

use test_utils::{declining_candles, oversold_snapshot, seeded_store};

fn scan_config(watchlist: &[&str]) -> ScanConfig {
    ScanConfig {
        watchlist: watchlist.iter().map(|s| s.to_string()).collect(),
        ..ScanConfig::default()
    }
}

#[tokio::test]
async fn oversold_symbol_produces_a_mean_reversion_signal() {
    let store = seeded_store().await;
    let provider = Arc::new(StaticProvider::new());
    provider.set_candles("AAPL", declining_candles(60, 55.0));

    let scanner = SignalScanner::new(store.clone(), provider, scan_config(&["AAPL"]));
    let summary = scanner.run().await;

    assert_eq!(summary.symbols_refreshed, 1);
    assert_eq!(summary.snapshots_scanned, 1);
    assert!(summary.signals_upserted >= 1);

    let signals = store.all_signals().await;
    assert!(signals
        .iter()
        .any(|s| s.symbol == "AAPL" && s.strategy_key == "rsi_mean_reversion"));
    // Every signal carries the snapshot it was evaluated against.
    for signal in &signals {
        assert_eq!(signal.snapshot.symbol, "AAPL");
        assert!(!signal.processed);
    }

    // The snapshot itself is persisted for the batch runner.
    assert!(store.get_snapshot("AAPL").await.unwrap().is_some());
}

#[tokio::test]
async fn symbol_without_candles_is_counted_unavailable() {
    let store = seeded_store().await;
    let provider = Arc::new(StaticProvider::new());
    provider.set_candles("AAPL", declining_candles(60, 55.0));

    let scanner = SignalScanner::new(store.clone(), provider, scan_config(&["AAPL", "MSFT"]));
    let summary = scanner.run().await;

    assert_eq!(summary.symbols_refreshed, 1);
    assert_eq!(summary.symbols_unavailable, 1);
}

#[tokio::test]
async fn rescan_updates_the_signal_instead_of_duplicating() {
    let store = seeded_store().await;
    let provider = Arc::new(StaticProvider::new());
    provider.set_candles("AAPL", declining_candles(60, 55.0));

    let scanner = SignalScanner::new(store.clone(), provider, scan_config(&["AAPL"]));
    scanner.run().await;
    let first = store.all_signals().await.len();
    scanner.run().await;
    assert_eq!(store.all_signals().await.len(), first);
}

#[tokio::test]
async fn stale_snapshots_are_skipped() {
    let store = seeded_store().await;
    let provider = Arc::new(StaticProvider::new());

    let mut snapshot = oversold_snapshot("AAPL", 50.0);
    snapshot.computed_at = Utc::now() - Duration::hours(100);
    store.upsert_snapshot(&snapshot).await.unwrap();

    // Empty watchlist: nothing is refreshed, the stale snapshot stands.
    let scanner = SignalScanner::new(store.clone(), provider, scan_config(&[]));
    let summary = scanner.run().await;

    assert_eq!(summary.snapshots_stale_skipped, 1);
    assert_eq!(summary.snapshots_scanned, 0);
    assert_eq!(summary.signals_upserted, 0);
    assert!(store.all_signals().await.is_empty());
}

#[tokio::test]
async fn out_of_gate_prices_never_signal() {
    let store = seeded_store().await;
    let provider = Arc::new(StaticProvider::new());
    // Deep decline ending at $15, below the $25 price gate.
    provider.set_candles("PENNY", declining_candles(60, 15.0));

    let scanner = SignalScanner::new(store.clone(), provider, scan_config(&["PENNY"]));
    let summary = scanner.run().await;

    assert_eq!(summary.symbols_refreshed, 1);
    assert_eq!(summary.signals_upserted, 0);
    assert!(store.all_signals().await.is_empty());
}
