//! RSI divergence detection
//!
//! Splits the trailing lookback window in half and compares where price
//! and RSI put their extremes. Bullish: price makes a lower low while RSI
//! makes a higher low. Bearish: price makes a higher high while RSI makes
//! a lower high.

use crate::indicators::momentum::rsi;
use crate::models::indicators::{DivergenceIndicator, TrendBias};
use crate::models::market::Candle;

pub fn calculate_divergence(
    candles: &[Candle],
    rsi_period: u32,
    lookback: u32,
) -> Option<DivergenceIndicator> {
    let lb = lookback as usize;
    if lb < 4 {
        return None;
    }
    let trail = rsi_series_tail(candles, rsi_period, lb)?;
    let closes: Vec<f64> = candles[candles.len() - lb..]
        .iter()
        .map(|c| c.close)
        .collect();

    let half = lb / 2;
    let (price_first, price_second) = closes.split_at(half);
    let (rsi_first, rsi_second) = trail.split_at(half);

    let signal = if min(price_second) < min(price_first) && min(rsi_second) > min(rsi_first) {
        TrendBias::Bullish
    } else if max(price_second) > max(price_first) && max(rsi_second) < max(rsi_first) {
        TrendBias::Bearish
    } else {
        TrendBias::Neutral
    };

    Some(DivergenceIndicator {
        signal,
        rsi_period,
        lookback,
    })
}

/// Last `lookback` values of the RSI trail, or None when the trail is
/// shorter than the window.
fn rsi_series_tail(candles: &[Candle], rsi_period: u32, lookback: usize) -> Option<Vec<f64>> {
    let trail = rsi::rsi_series(candles, rsi_period)?;
    if trail.len() < lookback {
        return None;
    }
    Some(trail[trail.len() - lookback..].to_vec())
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::MAX, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::MIN, f64::max)
}
