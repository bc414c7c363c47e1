//! Unit tests for the MACD indicator

use chrono::Utc;
use swingforge::indicators::momentum::macd::calculate_macd;
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
fn macd_requires_26_closes() {
    let candles = candles_from_closes(&[50.0; 25]);
    assert!(calculate_macd(&candles).is_none());
}

#[test]
fn macd_defined_from_exactly_26_closes() {
    // With one line point the signal degenerates to the line itself.
    let closes: Vec<f64> = (0..26).map(|i| 50.0 + i as f64 * 0.2).collect();
    let macd = calculate_macd(&candles_from_closes(&closes)).unwrap();
    assert_eq!(macd.macd, macd.signal);
    assert_eq!(macd.histogram, 0.0);
    assert_eq!(macd.period, Some((12, 26, 9)));
}

#[test]
fn macd_flat_series_is_zero() {
    let candles = candles_from_closes(&[50.0; 60]);
    let macd = calculate_macd(&candles).unwrap();
    assert!(macd.macd.abs() < 1e-9);
    assert!(macd.signal.abs() < 1e-9);
    assert!(macd.histogram.abs() < 1e-9);
}

#[test]
fn macd_positive_in_sustained_uptrend() {
    let closes: Vec<f64> = (0..60).map(|i| 50.0 + i as f64).collect();
    let macd = calculate_macd(&candles_from_closes(&closes)).unwrap();
    // Fast EMA tracks price more closely than slow in a steady climb.
    assert!(macd.macd > 0.0);
}

#[test]
fn macd_negative_in_sustained_downtrend() {
    let closes: Vec<f64> = (0..60).map(|i| 110.0 - i as f64).collect();
    let macd = calculate_macd(&candles_from_closes(&closes)).unwrap();
    assert!(macd.macd < 0.0);
}
