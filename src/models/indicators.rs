//! Indicator value structs and the per-symbol snapshot shared by all
//! strategies evaluated in a tick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<(u32, u32, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerIndicator {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (upper - lower) / middle * 100; None when the middle band is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    pub period: u32,
    pub k: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtrIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StochasticIndicator {
    pub k: f64,
    pub d: f64,
    pub k_period: u32,
    pub d_period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxIndicator {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmaIndicator {
    pub value: f64,
    pub period: u32,
}

/// Directional bias shared by divergence and MA-alignment indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TrendBias {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceIndicator {
    pub signal: TrendBias,
    pub rsi_period: u32,
    pub lookback: u32,
}

/// All indicator values for one symbol, computed once per tick from the
/// same candle series and shared by every strategy evaluated that tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    /// Close of the last candle the snapshot was computed from.
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<AtrIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stochastic: Option<StochasticIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adx: Option<AdxIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roc: Option<RocIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence: Option<DivergenceIndicator>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub smas: Vec<SmaIndicator>,
    /// Trailing volumes, most recent last. Holds volume_window + 1 entries
    /// when enough history exists.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub recent_volumes: Vec<f64>,
    pub computed_at: DateTime<Utc>,
}

impl IndicatorSnapshot {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            rsi: None,
            macd: None,
            bollinger: None,
            atr: None,
            stochastic: None,
            adx: None,
            roc: None,
            divergence: None,
            smas: Vec::new(),
            recent_volumes: Vec::new(),
            computed_at: Utc::now(),
        }
    }

    /// SMA value for a given period, if that rung was computed.
    pub fn sma(&self, period: u32) -> Option<f64> {
        self.smas
            .iter()
            .find(|s| s.period == period)
            .map(|s| s.value)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now - self.computed_at <= max_age
    }
}
