//! Qualifying-entry signals produced by the scanner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::indicators::IndicatorSnapshot;

/// One (symbol, strategy) pair that passed a strategy's entry conditions.
///
/// Upserted on re-detection, never duplicated. `processed` flips to true
/// only on a successful conversion to a trade; skipped signals stay
/// pending for retry by a later batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub symbol: String,
    pub strategy_key: String,
    /// Price at scan time.
    pub price: f64,
    /// Snapshot the entry conditions were evaluated against.
    pub snapshot: IndicatorSnapshot,
    pub processed: bool,
    pub scanned_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(
        symbol: impl Into<String>,
        strategy_key: impl Into<String>,
        price: f64,
        snapshot: IndicatorSnapshot,
    ) -> Self {
        Self {
            id: None,
            symbol: symbol.into(),
            strategy_key: strategy_key.into(),
            price,
            snapshot,
            processed: false,
            scanned_at: Utc::now(),
        }
    }
}
