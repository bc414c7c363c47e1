//! Unit tests for Bollinger Bands

use chrono::Utc;
use swingforge::indicators::volatility::bollinger::{
    calculate_bollinger, calculate_bollinger_default,
};
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
fn bollinger_insufficient_data() {
    let candles = candles_from_closes(&[50.0; 19]);
    assert!(calculate_bollinger(&candles, 20, 2.0).is_none());
}

#[test]
fn bollinger_flat_series_collapses_bands() {
    let candles = candles_from_closes(&[50.0; 25]);
    let bb = calculate_bollinger(&candles, 20, 2.0).unwrap();
    assert_eq!(bb.upper, 50.0);
    assert_eq!(bb.middle, 50.0);
    assert_eq!(bb.lower, 50.0);
    assert_eq!(bb.width, Some(0.0));
}

#[test]
fn bollinger_known_two_bar_window() {
    // Window [1, 3]: mean 2, population std dev 1, k = 2.
    let candles = candles_from_closes(&[9.0, 1.0, 3.0]);
    let bb = calculate_bollinger(&candles, 2, 2.0).unwrap();
    assert_eq!(bb.middle, 2.0);
    assert_eq!(bb.upper, 4.0);
    assert_eq!(bb.lower, 0.0);
    // (upper - lower) / middle * 100
    assert_eq!(bb.width, Some(200.0));
}

#[test]
fn bollinger_default_parameters() {
    let candles = candles_from_closes(&[50.0; 30]);
    let bb = calculate_bollinger_default(&candles).unwrap();
    assert_eq!(bb.period, 20);
    assert_eq!(bb.k, 2.0);
}
