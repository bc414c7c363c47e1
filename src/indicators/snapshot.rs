//! Per-symbol indicator snapshot computation.
//!
//! The snapshot is computed once per symbol per tick and shared by every
//! strategy evaluated that tick; strategies never recompute indicators.

use chrono::Utc;

use crate::models::indicators::IndicatorSnapshot;
use crate::models::market::Candle;

use super::momentum::{divergence, macd, roc, rsi, stochastic};
use super::trend::sma;
use super::volatility::{atr, bollinger};

/// Standard parameter set for the shared snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub rsi_period: u32,
    pub bollinger_period: u32,
    pub bollinger_k: f64,
    pub stochastic_k: u32,
    pub stochastic_d: u32,
    pub adx_period: u32,
    pub atr_period: u32,
    pub roc_period: u32,
    pub divergence_lookback: u32,
    pub volume_window: u32,
    pub sma_periods: Vec<u32>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            bollinger_period: 20,
            bollinger_k: 2.0,
            stochastic_k: 14,
            stochastic_d: 3,
            adx_period: 14,
            atr_period: 14,
            roc_period: 12,
            divergence_lookback: 14,
            volume_window: 20,
            sma_periods: vec![10, 20, 50, 100, 200],
        }
    }
}

/// Compute the full snapshot from an ascending candle series.
///
/// Indicators without enough history are simply absent; only an empty
/// series yields no snapshot at all.
pub fn compute_snapshot(
    symbol: &str,
    candles: &[Candle],
    config: &SnapshotConfig,
) -> Option<IndicatorSnapshot> {
    let last = candles.last()?;

    let mut snapshot = IndicatorSnapshot::new(symbol, last.close);
    snapshot.computed_at = Utc::now();
    snapshot.rsi = rsi::calculate_rsi(candles, config.rsi_period);
    snapshot.macd = macd::calculate_macd(candles);
    snapshot.bollinger =
        bollinger::calculate_bollinger(candles, config.bollinger_period, config.bollinger_k);
    snapshot.atr = atr::calculate_atr(candles, config.atr_period);
    snapshot.stochastic =
        stochastic::calculate_stochastic(candles, config.stochastic_k, config.stochastic_d);
    snapshot.adx = super::trend::adx::calculate_adx(candles, config.adx_period);
    snapshot.roc = roc::calculate_roc(candles, config.roc_period);
    snapshot.divergence =
        divergence::calculate_divergence(candles, config.rsi_period, config.divergence_lookback);
    snapshot.smas = sma::calculate_smas(candles, &config.sma_periods);

    let keep = config.volume_window as usize + 1;
    let start = candles.len().saturating_sub(keep);
    snapshot.recent_volumes = candles[start..].iter().map(|c| c.volume).collect();

    Some(snapshot)
}
