//! EMA (Exponential Moving Average) indicator

use crate::indicators::math;
use crate::models::market::Candle;

/// Calculate EMA for a specific period
pub fn calculate_ema(candles: &[Candle], period: u32) -> Option<f64> {
    if candles.len() < period as usize {
        return None;
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::ema(&closes, period as usize)
}
