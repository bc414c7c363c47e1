//! RSI (Relative Strength Index) indicator
//!
//! RSI = 100 - (100 / (1 + RS)), RS = smoothed gain / smoothed loss,
//! with Wilder's smoothing over the full change history.

use crate::models::indicators::RsiIndicator;
use crate::models::market::Candle;

/// Calculate RSI with Wilder smoothing.
///
/// Returns exactly 100.0 when the smoothed loss is zero.
pub fn calculate_rsi(candles: &[Candle], period: u32) -> Option<RsiIndicator> {
    let trail = rsi_series(candles, period)?;
    trail.last().map(|&value| RsiIndicator { value, period })
}

/// Per-bar Wilder RSI trail, one value per candle from index `period`
/// onward. Used directly by the divergence indicator.
pub fn rsi_series(candles: &[Candle], period: u32) -> Option<Vec<f64>> {
    let period = period as usize;
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::with_capacity(candles.len() - 1);
    let mut losses = Vec::with_capacity(candles.len() - 1);
    for pair in candles.windows(2) {
        let change = pair[1].close - pair[0].close;
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(gains.len() - period + 1);
    series.push(rsi_value(avg_gain, avg_loss));
    for i in period..gains.len() {
        avg_gain = (avg_gain * (period as f64 - 1.0) + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + losses[i]) / period as f64;
        series.push(rsi_value(avg_gain, avg_loss));
    }
    Some(series)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(candles: &[Candle]) -> Option<RsiIndicator> {
    calculate_rsi(candles, 14)
}
