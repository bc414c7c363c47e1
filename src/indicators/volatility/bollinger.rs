//! Bollinger Bands indicator

use crate::indicators::math;
use crate::models::indicators::BollingerIndicator;
use crate::models::market::Candle;

/// Calculate Bollinger Bands: SMA(period) +/- k * population standard
/// deviation over the trailing window. Width is (upper - lower) / middle
/// as a percentage, undefined when the middle band is zero.
pub fn calculate_bollinger(candles: &[Candle], period: u32, k: f64) -> Option<BollingerIndicator> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let middle = math::sma(&closes, period as usize)?;
    let std_dev = math::population_std_dev(&closes, period as usize)?;

    let upper = middle + k * std_dev;
    let lower = middle - k * std_dev;
    let width = if middle != 0.0 {
        Some((upper - lower) / middle * 100.0)
    } else {
        None
    };

    Some(BollingerIndicator {
        upper,
        middle,
        lower,
        width,
        period,
        k,
    })
}

/// Calculate Bollinger Bands with default parameters (20, 2.0)
pub fn calculate_bollinger_default(candles: &[Candle]) -> Option<BollingerIndicator> {
    calculate_bollinger(candles, 20, 2.0)
}
