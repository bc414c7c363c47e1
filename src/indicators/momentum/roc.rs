//! Rate of change indicator

use crate::models::indicators::RocIndicator;
use crate::models::market::Candle;

/// Percent change of the latest close vs the close `period` bars ago.
pub fn calculate_roc(candles: &[Candle], period: u32) -> Option<RocIndicator> {
    let p = period as usize;
    if p == 0 || candles.len() < p + 1 {
        return None;
    }
    let latest = candles[candles.len() - 1].close;
    let base = candles[candles.len() - 1 - p].close;
    if base == 0.0 {
        return None;
    }
    Some(RocIndicator {
        value: (latest - base) / base * 100.0,
        period,
    })
}

/// Calculate ROC with default period (12)
pub fn calculate_roc_default(candles: &[Candle]) -> Option<RocIndicator> {
    calculate_roc(candles, 12)
}
