//! Stochastic oscillator

use crate::models::indicators::StochasticIndicator;
use crate::models::market::Candle;

/// Calculate the stochastic oscillator.
///
/// %K compares the close to the trailing k-window high/low; %D is the
/// simple average of the last `d_period` %K values. %K pins to 50 when
/// the window high equals the window low.
pub fn calculate_stochastic(
    candles: &[Candle],
    k_period: u32,
    d_period: u32,
) -> Option<StochasticIndicator> {
    let k = k_period as usize;
    let d = d_period as usize;
    if k == 0 || d == 0 || candles.len() < k + d - 1 {
        return None;
    }

    // %K for each of the last d bars, each over its own trailing window.
    let mut k_values = Vec::with_capacity(d);
    for back in (0..d).rev() {
        let end = candles.len() - back;
        let window = &candles[end - k..end];
        k_values.push(percent_k(window));
    }

    let k_latest = *k_values.last()?;
    let d_value = k_values.iter().sum::<f64>() / d as f64;

    Some(StochasticIndicator {
        k: k_latest,
        d: d_value,
        k_period,
        d_period,
    })
}

fn percent_k(window: &[Candle]) -> f64 {
    let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let close = window[window.len() - 1].close;
    if high == low {
        // Flat window; midpoint avoids division by zero.
        return 50.0;
    }
    (close - low) / (high - low) * 100.0
}

/// Calculate stochastic with default periods (14, 3)
pub fn calculate_stochastic_default(candles: &[Candle]) -> Option<StochasticIndicator> {
    calculate_stochastic(candles, 14, 3)
}
