//! Momentum indicators.

pub mod divergence;
pub mod macd;
pub mod roc;
pub mod rsi;
pub mod stochastic;
