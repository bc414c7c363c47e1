//! Shared numeric helpers for indicator calculations.

/// Simple moving average of the trailing `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    Some(values[values.len() - period..].iter().sum::<f64>() / period as f64)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation of the trailing `period` values.
pub fn population_std_dev(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
    Some(variance.sqrt())
}

/// EMA trail seeded with the SMA of the first `period` values.
///
/// Element `j` corresponds to input index `j + period - 1`.
pub fn ema_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);
    let mut prev = seed;
    for &value in &values[period..] {
        prev = (value - prev) * alpha + prev;
        series.push(prev);
    }
    Some(series)
}

/// Latest EMA value.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).and_then(|s| s.last().copied())
}

/// Wilder's smoothed average: seed with the mean of the first `period`
/// values, then `avg = (prev * (period - 1) + value) / period`.
pub fn wilder_smooth(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let mut avg = values[..period].iter().sum::<f64>() / period as f64;
    for &value in &values[period..] {
        avg = (avg * (period as f64 - 1.0) + value) / period as f64;
    }
    Some(avg)
}

/// True range: the largest of high-low, |high-prevClose|, |low-prevClose|.
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}
