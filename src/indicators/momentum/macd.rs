//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::math;
use crate::models::indicators::MacdIndicator;
use crate::models::market::Candle;

const FAST: usize = 12;
const SLOW: usize = 26;
const SIGNAL: usize = 9;

/// Calculate MACD(12, 26, 9).
///
/// MACD line = EMA(12) - EMA(26); signal = EMA(9) of the line; histogram
/// = line - signal. Fully defined from 26 closes: while the line has
/// fewer than 9 points the signal seed degenerates to the line mean.
pub fn calculate_macd(candles: &[Candle]) -> Option<MacdIndicator> {
    if candles.len() < SLOW {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast = math::ema_series(&closes, FAST)?;
    let slow = math::ema_series(&closes, SLOW)?;

    // Align the two trails on the last bar.
    let offset = fast.len() - slow.len();
    let line: Vec<f64> = slow
        .iter()
        .enumerate()
        .map(|(i, s)| fast[i + offset] - s)
        .collect();

    let macd = *line.last()?;
    let signal = if line.len() >= SIGNAL {
        math::ema(&line, SIGNAL)?
    } else {
        math::mean(&line)?
    };

    Some(MacdIndicator {
        macd,
        signal,
        histogram: macd - signal,
        period: Some((FAST as u32, SLOW as u32, SIGNAL as u32)),
    })
}
