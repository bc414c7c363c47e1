//! Moving-average alignment

use crate::indicators::trend::sma::calculate_sma;
use crate::models::indicators::TrendBias;
use crate::models::market::Candle;

/// Bullish when short > medium > long SMA, bearish when strictly
/// reversed, else neutral. Undefined when any rung lacks history.
pub fn ma_alignment(candles: &[Candle], short: u32, medium: u32, long: u32) -> Option<TrendBias> {
    let s = calculate_sma(candles, short)?.value;
    let m = calculate_sma(candles, medium)?.value;
    let l = calculate_sma(candles, long)?.value;
    alignment_of(s, m, l)
}

/// Alignment from already-computed SMA values.
pub fn alignment_of(short: f64, medium: f64, long: f64) -> Option<TrendBias> {
    Some(if short > medium && medium > long {
        TrendBias::Bullish
    } else if short < medium && medium < long {
        TrendBias::Bearish
    } else {
        TrendBias::Neutral
    })
}
