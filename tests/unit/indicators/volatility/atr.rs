//! Unit tests for the ATR indicator

use chrono::Utc;
use swingforge::indicators::volatility::atr::{calculate_atr, calculate_atr_default};
use swingforge::models::market::Candle;

fn candle(high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp: Utc::now(),
        open: close,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

#[test]
fn atr_insufficient_data() {
    // Needs period + 1 candles for the first true range.
    let candles: Vec<Candle> = (0..14).map(|_| candle(12.0, 10.0, 11.0)).collect();
    assert!(calculate_atr(&candles, 14).is_none());
}

#[test]
fn atr_constant_range_equals_that_range() {
    let candles: Vec<Candle> = (0..30).map(|_| candle(12.0, 10.0, 11.0)).collect();
    let atr = calculate_atr(&candles, 14).unwrap();
    assert!((atr.value - 2.0).abs() < 1e-9);
    assert_eq!(atr.period, 14);
}

#[test]
fn atr_picks_up_gap_moves() {
    // A large gap inflates the true range beyond the bar's own span.
    let mut candles: Vec<Candle> = (0..20).map(|_| candle(12.0, 10.0, 11.0)).collect();
    candles.push(candle(22.0, 21.0, 21.5));
    let atr = calculate_atr(&candles, 14).unwrap();
    assert!(atr.value > 2.0);
}

#[test]
fn atr_default_uses_period_14() {
    let candles: Vec<Candle> = (0..30).map(|_| candle(12.0, 10.0, 11.0)).collect();
    let atr = calculate_atr_default(&candles).unwrap();
    assert_eq!(atr.period, 14);
}
