//! Unit tests for RSI divergence detection

use chrono::Utc;
use swingforge::indicators::momentum::divergence::calculate_divergence;
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
fn divergence_needs_lookback_of_at_least_4() {
    let candles = candles_from_closes(&[50.0; 30]);
    assert!(calculate_divergence(&candles, 14, 3).is_none());
}

#[test]
fn divergence_needs_full_rsi_trail() {
    // 14-period RSI over 16 candles leaves a 2-value trail, shorter than
    // the lookback window.
    let candles = candles_from_closes(&[50.0; 16]);
    assert!(calculate_divergence(&candles, 14, 4).is_none());
}

#[test]
fn steady_uptrend_is_neutral() {
    let closes: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
    let div = calculate_divergence(&candles_from_closes(&closes), 14, 14).unwrap();
    assert_eq!(div.signal, TrendBias::Neutral);
    assert_eq!(div.rsi_period, 14);
    assert_eq!(div.lookback, 14);
}

#[test]
fn lower_price_low_with_higher_rsi_low_is_bullish() {
    // Price makes a marginal new low late in the window while momentum
    // has already turned: RSI's low in the second half sits above its
    // low in the first half.
    let closes = [100.0, 90.0, 95.0, 80.0, 85.0, 79.5];
    let div = calculate_divergence(&candles_from_closes(&closes), 2, 4).unwrap();
    assert_eq!(div.signal, TrendBias::Bullish);
}

#[test]
fn higher_price_high_with_lower_rsi_high_is_bearish() {
    let closes = [100.0, 110.0, 105.0, 120.0, 115.0, 120.5];
    let div = calculate_divergence(&candles_from_closes(&closes), 2, 4).unwrap();
    assert_eq!(div.signal, TrendBias::Bearish);
}
