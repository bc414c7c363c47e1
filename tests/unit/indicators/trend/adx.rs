//! Unit tests for the directional movement index

use chrono::Utc;
use swingforge::indicators::trend::adx::{calculate_adx, calculate_adx_default};
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

fn uptrend(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = 100.0 + i as f64;
            candle(base + 1.0, base, base + 0.5)
        })
        .collect()
}

#[test]
fn adx_insufficient_data() {
    assert!(calculate_adx(&uptrend(14), 14).is_none());
}

#[test]
fn adx_one_sided_uptrend_pins_to_100() {
    // Every bar moves up, so -DM never accumulates and DX is maximal.
    let adx = calculate_adx(&uptrend(20), 14).unwrap();
    assert_eq!(adx.adx, 100.0);
    assert_eq!(adx.minus_di, 0.0);
    assert!(adx.plus_di > 0.0);
    assert_eq!(adx.period, 14);
}

#[test]
fn adx_one_sided_downtrend_pins_to_100() {
    let candles: Vec<Candle> = (0..20)
        .map(|i| {
            let base = 200.0 - i as f64;
            candle(base + 1.0, base, base + 0.5)
        })
        .collect();
    let adx = calculate_adx(&candles, 14).unwrap();
    assert_eq!(adx.adx, 100.0);
    assert_eq!(adx.plus_di, 0.0);
    assert!(adx.minus_di > 0.0);
}

#[test]
fn adx_flat_series_is_undefined() {
    // Zero true range over the whole window.
    let candles: Vec<Candle> = (0..20).map(|_| candle(50.0, 50.0, 50.0)).collect();
    assert!(calculate_adx(&candles, 14).is_none());
}

#[test]
fn adx_default_uses_period_14() {
    let adx = calculate_adx_default(&uptrend(30)).unwrap();
    assert_eq!(adx.period, 14);
}
