//! Declarative condition vocabulary.
//!
//! Conditions are a closed tagged enum, one variant per indicator family,
//! each carrying only its relevant parameters. Unknown tags deserialize to
//! the explicit `Unsupported` variant, which always evaluates to pass —
//! strategies can grow new condition types without breaking older engines.

use serde::{Deserialize, Serialize};

use super::indicators::TrendBias;

/// Canonical comparator. One spelling per family; `Between` is inclusive
/// on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Comparison {
    Above { value: f64 },
    Below { value: f64 },
    Between { min: f64, max: f64 },
}

impl Comparison {
    pub fn check(&self, value: f64) -> bool {
        match self {
            Comparison::Above { value: threshold } => value > *threshold,
            Comparison::Below { value: threshold } => value < *threshold,
            Comparison::Between { min, max } => value >= *min && value <= *max,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Comparison::Above { value } => format!("> {:.2}", value),
            Comparison::Below { value } => format!("< {:.2}", value),
            Comparison::Between { min, max } => format!("in [{:.2}, {:.2}]", min, max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdCheck {
    /// MACD line above its signal line.
    Bullish,
    /// MACD line below its signal line.
    Bearish,
    HistogramPositive,
    HistogramNegative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePosition {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StochasticCheck {
    K { comparison: Comparison },
    KAboveD,
    KBelowD,
}

/// One condition over the indicator snapshot and current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionSpec {
    Rsi {
        period: u32,
        comparison: Comparison,
    },
    Macd {
        check: MacdCheck,
    },
    Bollinger {
        band: BollingerBand,
        position: PricePosition,
    },
    BollingerWidth {
        comparison: Comparison,
    },
    Stochastic {
        check: StochasticCheck,
    },
    Adx {
        min_strength: f64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        direction: Option<TrendBias>,
    },
    Volume {
        period: u32,
        multiplier: f64,
    },
    RateOfChange {
        period: u32,
        comparison: Comparison,
    },
    Divergence {
        expected: TrendBias,
    },
    MaAlignment {
        short: u32,
        medium: u32,
        long: u32,
        expected: TrendBias,
    },
    PriceVsMa {
        period: u32,
        position: PricePosition,
    },
    /// Catch-all for condition types this engine does not know. Always
    /// evaluates to pass (documented leniency).
    #[serde(other)]
    Unsupported,
}

impl ConditionSpec {
    pub fn family(&self) -> &'static str {
        match self {
            ConditionSpec::Rsi { .. } => "RSI",
            ConditionSpec::Macd { .. } => "MACD",
            ConditionSpec::Bollinger { .. } => "BOLLINGER",
            ConditionSpec::BollingerWidth { .. } => "BOLLINGER_WIDTH",
            ConditionSpec::Stochastic { .. } => "STOCHASTIC",
            ConditionSpec::Adx { .. } => "ADX",
            ConditionSpec::Volume { .. } => "VOLUME",
            ConditionSpec::RateOfChange { .. } => "ROC",
            ConditionSpec::Divergence { .. } => "DIVERGENCE",
            ConditionSpec::MaAlignment { .. } => "MA_ALIGNMENT",
            ConditionSpec::PriceVsMa { .. } => "PRICE_VS_MA",
            ConditionSpec::Unsupported => "UNSUPPORTED",
        }
    }
}
