//! Unit tests for moving-average alignment

use chrono::Utc;
use swingforge::indicators::trend::alignment::{alignment_of, ma_alignment};
use swingforge::models::indicators::TrendBias;
use swingforge::models::market::Candle;

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .map(|&close| Candle {
            timestamp: Utc::now(),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000.0,
        })
        .collect()
}

#[test]
fn strictly_descending_ladder_is_bullish() {
    assert_eq!(alignment_of(55.0, 52.0, 50.0), Some(TrendBias::Bullish));
}

#[test]
fn strictly_ascending_ladder_is_bearish() {
    assert_eq!(alignment_of(48.0, 50.0, 53.0), Some(TrendBias::Bearish));
}

#[test]
fn equal_rungs_are_neutral() {
    assert_eq!(alignment_of(50.0, 50.0, 50.0), Some(TrendBias::Neutral));
    assert_eq!(alignment_of(51.0, 50.0, 50.5), Some(TrendBias::Neutral));
}

#[test]
fn uptrend_candles_align_bullish() {
    // In a steady climb the short SMA sits above the longer ones.
    let closes: Vec<f64> = (0..120).map(|i| 50.0 + i as f64 * 0.5).collect();
    let bias = ma_alignment(&candles_from_closes(&closes), 10, 20, 50).unwrap();
    assert_eq!(bias, TrendBias::Bullish);
}

#[test]
fn alignment_undefined_without_longest_rung() {
    let closes: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
    assert!(ma_alignment(&candles_from_closes(&closes), 10, 20, 50).is_none());
}
