//! Market data provider interface.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::market::{Candle, Quote};

/// Pull-based market data source.
///
/// "Unavailable" is expressed in the return types (None / empty vec), not
/// as errors: a missing quote skips one symbol for one tick, it never
/// fails a run.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Last traded price, or None when unavailable.
    async fn get_quote(&self, symbol: &str) -> Option<Quote>;

    /// OHLCV series ascending by time; empty when unavailable.
    async fn get_candles(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        resolution: &str,
    ) -> Vec<Candle>;
}

/// Fixed in-memory provider for tests and local development.
#[derive(Default)]
pub struct StaticProvider {
    quotes: RwLock<HashMap<String, f64>>,
    candles: RwLock<HashMap<String, Vec<Candle>>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_quote(&self, symbol: &str, price: f64) {
        self.quotes
            .write()
            .expect("quote map poisoned")
            .insert(symbol.to_string(), price);
    }

    pub fn remove_quote(&self, symbol: &str) {
        self.quotes
            .write()
            .expect("quote map poisoned")
            .remove(symbol);
    }

    pub fn set_candles(&self, symbol: &str, candles: Vec<Candle>) {
        self.candles
            .write()
            .expect("candle map poisoned")
            .insert(symbol.to_string(), candles);
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    async fn get_quote(&self, symbol: &str) -> Option<Quote> {
        self.quotes
            .read()
            .expect("quote map poisoned")
            .get(symbol)
            .map(|&price| Quote::new(symbol, price))
    }

    async fn get_candles(
        &self,
        symbol: &str,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
        _resolution: &str,
    ) -> Vec<Candle> {
        self.candles
            .read()
            .expect("candle map poisoned")
            .get(symbol)
            .cloned()
            .unwrap_or_default()
    }
}
