//! Trend indicators.

pub mod adx;
pub mod alignment;
pub mod ema;
pub mod sma;
