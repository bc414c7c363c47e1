//! External collaborators: market data providers.

pub mod finnhub;
pub mod market_data;

pub use market_data::{MarketDataProvider, StaticProvider};
