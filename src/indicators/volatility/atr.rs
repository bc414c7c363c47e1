//! ATR (Average True Range) indicator

use crate::indicators::math;
use crate::models::indicators::AtrIndicator;
use crate::models::market::Candle;

/// Calculate ATR with Wilder's smoothing over the true-range series.
pub fn calculate_atr(candles: &[Candle], period: u32) -> Option<AtrIndicator> {
    if candles.len() < period as usize + 1 {
        return None;
    }

    let tr_values: Vec<f64> = candles
        .windows(2)
        .map(|pair| math::true_range(pair[1].high, pair[1].low, pair[0].close))
        .collect();

    let value = math::wilder_smooth(&tr_values, period as usize)?;

    Some(AtrIndicator { value, period })
}

/// Calculate ATR with default period (14)
pub fn calculate_atr_default(candles: &[Candle]) -> Option<AtrIndicator> {
    calculate_atr(candles, 14)
}
