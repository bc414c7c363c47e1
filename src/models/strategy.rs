//! Strategy definitions.

use serde::{Deserialize, Serialize};

use super::condition::ConditionSpec;

/// Inclusive price gate checked before any entry condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// How the exit condition list combines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExitCombinator {
    All,
    #[default]
    Any,
}

/// Exactly one stop-loss policy is active per strategy. Each variant
/// carries its own parameters, so partial shapes cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum StopLossPolicy {
    /// No stop-loss; the strategy relies on indicator exits alone.
    #[default]
    None,
    /// Exit when unrealized percent P&L drops to -percent.
    FixedPercent { percent: f64 },
    /// Exit when price touches the ATR-based stop precomputed at entry.
    AtrFixed { multiplier: f64 },
    /// Trailing stop anchored `multiplier * entry ATR` below the
    /// high-water mark.
    AtrTrailing { multiplier: f64 },
    /// Exit when price falls under the current middle Bollinger band.
    BollingerMiddle,
    /// Exit when the MACD histogram drops below its value at entry.
    MacdTrough,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDefinition {
    /// Stable identifier, used as the signal/simulation key.
    pub key: String,
    pub name: String,
    pub active: bool,
    pub price_range: PriceRange,
    /// Ordered entry list; all conditions must pass (implicit ALL).
    pub entry_conditions: Vec<ConditionSpec>,
    /// Ordered exit list combined per `exit_combinator`.
    #[serde(default)]
    pub exit_conditions: Vec<ConditionSpec>,
    #[serde(default)]
    pub exit_combinator: ExitCombinator,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profit_target_pct: Option<f64>,
    #[serde(default)]
    pub stop_loss: StopLossPolicy,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_hold_days: Option<i64>,
    /// Fraction of current capital committed per entry (0.0 - 1.0).
    pub position_size_pct: f64,
    pub initial_capital: f64,
    /// Hard cap on completed trades before the simulation flips to
    /// Completed and stops entering.
    pub trade_limit: u32,
}
