//! Finnhub-style REST market data provider.
//!
//! Read-only lookups retry with exponential backoff (three attempts) and
//! quotes fall back to the last known value when the API stays down.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::market::{Candle, Quote};

use super::market_data::MarketDataProvider;

pub struct FinnhubProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Last successful quote per symbol, served when the API is down.
    last_known: RwLock<HashMap<String, Quote>>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price.
    c: f64,
}

#[derive(Debug, Deserialize)]
struct CandleResponse {
    s: String,
    #[serde(default)]
    t: Vec<i64>,
    #[serde(default)]
    o: Vec<f64>,
    #[serde(default)]
    h: Vec<f64>,
    #[serde(default)]
    l: Vec<f64>,
    #[serde(default)]
    c: Vec<f64>,
    #[serde(default)]
    v: Vec<f64>,
}

impl FinnhubProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            last_known: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            crate::config::get_finnhub_base_url(),
            crate::config::get_finnhub_api_key(),
        )
    }

    fn retry_policy() -> ExponentialBuilder {
        // Three attempts total.
        ExponentialBuilder::default()
            .with_min_delay(std::time::Duration::from_millis(200))
            .with_max_times(2)
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteResponse, reqwest::Error> {
        let url = format!("{}/quote", self.base_url);
        self.client
            .get(&url)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .send()
            .await?
            .error_for_status()?
            .json::<QuoteResponse>()
            .await
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        resolution: &str,
    ) -> Result<CandleResponse, reqwest::Error> {
        let url = format!("{}/stock/candle", self.base_url);
        self.client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("resolution", resolution),
                ("from", &from.timestamp().to_string()),
                ("to", &to.timestamp().to_string()),
                ("token", &self.api_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<CandleResponse>()
            .await
    }
}

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    async fn get_quote(&self, symbol: &str) -> Option<Quote> {
        let result = (|| self.fetch_quote(symbol))
            .retry(Self::retry_policy())
            .await;

        match result {
            Ok(response) if response.c > 0.0 => {
                let quote = Quote::new(symbol, response.c);
                self.last_known
                    .write()
                    .expect("quote cache poisoned")
                    .insert(symbol.to_string(), quote.clone());
                Some(quote)
            }
            Ok(_) => {
                debug!(symbol = %symbol, "quote response without a usable price");
                None
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "quote fetch failed, using last known");
                self.last_known
                    .read()
                    .expect("quote cache poisoned")
                    .get(symbol)
                    .cloned()
            }
        }
    }

    async fn get_candles(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        resolution: &str,
    ) -> Vec<Candle> {
        let result = (|| self.fetch_candles(symbol, from, to, resolution))
            .retry(Self::retry_policy())
            .await;

        let response = match result {
            Ok(r) if r.s == "ok" => r,
            Ok(r) => {
                debug!(symbol = %symbol, status = %r.s, "no candle data");
                return Vec::new();
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "candle fetch failed");
                return Vec::new();
            }
        };

        let mut candles = Vec::with_capacity(response.t.len());
        for i in 0..response.t.len() {
            let (Some(&o), Some(&h), Some(&l), Some(&c), Some(&v)) = (
                response.o.get(i),
                response.h.get(i),
                response.l.get(i),
                response.c.get(i),
                response.v.get(i),
            ) else {
                continue;
            };
            let Some(timestamp) = Utc.timestamp_opt(response.t[i], 0).single() else {
                continue;
            };
            candles.push(Candle {
                timestamp,
                open: o,
                high: h,
                low: l,
                close: c,
                volume: v,
            });
        }
        candles.sort_by_key(|c| c.timestamp);
        candles
    }
}
