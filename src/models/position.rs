//! Open positions and their trade records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::market::MarketSession;

/// Why a position was closed, in exit-check priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    TimeExit,
    ProfitTarget,
    StopLoss,
    AtrStop,
    AtrTrailingStop,
    BbMiddleStop,
    MacdTroughStop,
    RsiExit,
    MacdExit,
    BbExit,
    StochasticExit,
    AdxExit,
    VolumeExit,
    RocExit,
    DivergenceExit,
    MaExit,
    IndicatorExit,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::TimeExit => "TIME_EXIT",
            ExitReason::ProfitTarget => "PROFIT_TARGET",
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::AtrStop => "ATR_STOP",
            ExitReason::AtrTrailingStop => "ATR_TRAILING_STOP",
            ExitReason::BbMiddleStop => "BB_MIDDLE_STOP",
            ExitReason::MacdTroughStop => "MACD_TROUGH_STOP",
            ExitReason::RsiExit => "RSI_EXIT",
            ExitReason::MacdExit => "MACD_EXIT",
            ExitReason::BbExit => "BB_EXIT",
            ExitReason::StochasticExit => "STOCHASTIC_EXIT",
            ExitReason::AdxExit => "ADX_EXIT",
            ExitReason::VolumeExit => "VOLUME_EXIT",
            ExitReason::RocExit => "ROC_EXIT",
            ExitReason::DivergenceExit => "DIVERGENCE_EXIT",
            ExitReason::MaExit => "MA_EXIT",
            ExitReason::IndicatorExit => "INDICATOR_EXIT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "TIME_EXIT" => ExitReason::TimeExit,
            "PROFIT_TARGET" => ExitReason::ProfitTarget,
            "STOP_LOSS" => ExitReason::StopLoss,
            "ATR_STOP" => ExitReason::AtrStop,
            "ATR_TRAILING_STOP" => ExitReason::AtrTrailingStop,
            "BB_MIDDLE_STOP" => ExitReason::BbMiddleStop,
            "MACD_TROUGH_STOP" => ExitReason::MacdTroughStop,
            "RSI_EXIT" => ExitReason::RsiExit,
            "MACD_EXIT" => ExitReason::MacdExit,
            "BB_EXIT" => ExitReason::BbExit,
            "STOCHASTIC_EXIT" => ExitReason::StochasticExit,
            "ADX_EXIT" => ExitReason::AdxExit,
            "VOLUME_EXIT" => ExitReason::VolumeExit,
            "ROC_EXIT" => ExitReason::RocExit,
            "DIVERGENCE_EXIT" => ExitReason::DivergenceExit,
            "MA_EXIT" => ExitReason::MaExit,
            "INDICATOR_EXIT" => ExitReason::IndicatorExit,
            _ => return None,
        })
    }
}

/// One open position. At most one exists per (simulation, symbol); the
/// record is deleted when the position closes — the Trade is the only
/// standing evidence afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub simulation_id: i64,
    pub trade_id: i64,
    pub symbol: String,
    pub shares: i64,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    // Live mark, refreshed every tick.
    pub current_price: f64,
    pub current_value: f64,
    pub unrealized_pl: f64,
    pub unrealized_pl_pct: f64,
    /// Highest price seen since entry; ratchets up, never down.
    pub high_water_mark: f64,
    /// ATR at entry, kept for the trailing-stop distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_atr: Option<f64>,
    /// Fixed ATR stop price precomputed at entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr_stop_price: Option<f64>,
    /// MACD histogram at entry, for the MACD-trough stop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_macd_histogram: Option<f64>,
}

impl Position {
    pub fn unrealized_pct(entry_price: f64, price: f64) -> f64 {
        if entry_price == 0.0 {
            return 0.0;
        }
        (price - entry_price) / entry_price * 100.0
    }
}

/// One simulated trade: the open leg is written when the position opens,
/// the exit fields are stamped exactly once at close, after which the
/// record is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub simulation_id: i64,
    pub symbol: String,
    pub strategy_key: String,
    pub shares: i64,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<ExitReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_pl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_pl_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_session: Option<MarketSession>,
}

/// Exit fill handed to the store's atomic close.
#[derive(Debug, Clone)]
pub struct ExitFill {
    pub price: f64,
    pub time: DateTime<Utc>,
    pub reason: ExitReason,
}
