//! Per-run quote cache with bounded-concurrency prefetch.
//!
//! Owned by one batch run and dropped with it; there is no hidden
//! cross-invocation quote state.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{Duration as ChronoDuration, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::debug;

use crate::models::market::Quote;
use crate::services::MarketDataProvider;

pub struct QuoteCache {
    quotes: HashMap<String, Quote>,
    ttl: ChronoDuration,
}

impl QuoteCache {
    pub fn new(ttl: ChronoDuration) -> Self {
        Self {
            quotes: HashMap::new(),
            ttl,
        }
    }

    /// Fresh quote for a symbol, if one is cached.
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes
            .get(symbol)
            .filter(|q| Utc::now() - q.fetched_at <= self.ttl)
    }

    pub fn insert(&mut self, quote: Quote) {
        self.quotes.insert(quote.symbol.clone(), quote);
    }

    /// Fetch quotes for symbols not already cached, `concurrency` at a
    /// time with an inter-batch delay, stopping at the deadline. Returns
    /// the number of symbols that stayed unavailable.
    pub async fn prefetch(
        &mut self,
        provider: &dyn MarketDataProvider,
        symbols: &[String],
        concurrency: usize,
        delay: std::time::Duration,
        deadline: Instant,
    ) -> u32 {
        let mut missing: Vec<String> = symbols
            .iter()
            .filter(|s| self.get(s).is_none())
            .cloned()
            .collect();
        missing.sort();
        missing.dedup();

        let mut unavailable = 0;
        let mut first = true;
        for chunk in missing.chunks(concurrency.max(1)) {
            if Instant::now() >= deadline {
                break;
            }
            if !first {
                tokio::time::sleep(delay).await;
            }
            first = false;

            let fetched: Vec<Option<Quote>> = stream::iter(chunk.to_vec())
                .map(|symbol| async move { provider.get_quote(&symbol).await })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

            for quote in fetched.into_iter() {
                match quote {
                    Some(q) => self.insert(q),
                    None => unavailable += 1,
                }
            }
        }

        debug!(
            requested = symbols.len(),
            unavailable = unavailable,
            "quote prefetch complete"
        );
        unavailable
    }
}
