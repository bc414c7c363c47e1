//! Per-strategy capital ledger.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationStatus {
    Active,
    Completed,
}

impl SimulationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationStatus::Active => "ACTIVE",
            SimulationStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(SimulationStatus::Active),
            "COMPLETED" => Some(SimulationStatus::Completed),
            _ => None,
        }
    }
}

/// Capital ledger for one strategy's simulation. Running aggregates are
/// updated incrementally on every closed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub strategy_key: String,
    pub initial_capital: f64,
    pub current_capital: f64,
    pub total_pl: f64,
    pub trades_completed: u32,
    pub wins: u32,
    pub losses: u32,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Running peak of realized capital; the drawdown base.
    pub peak_capital: f64,
    /// Largest peak-minus-current delta seen so far. Never decreases.
    pub max_drawdown: f64,
    pub trade_limit: u32,
    pub status: SimulationStatus,
}

impl Simulation {
    pub fn new(strategy_key: impl Into<String>, initial_capital: f64, trade_limit: u32) -> Self {
        Self {
            id: None,
            strategy_key: strategy_key.into(),
            initial_capital,
            current_capital: initial_capital,
            total_pl: 0.0,
            trades_completed: 0,
            wins: 0,
            losses: 0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
            peak_capital: initial_capital,
            max_drawdown: 0.0,
            trade_limit,
            status: SimulationStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SimulationStatus::Active
    }

    pub fn win_rate(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided == 0 {
            return 0.0;
        }
        self.wins as f64 / decided as f64
    }

    /// Gross profit over gross loss; 0 when no losses yet.
    pub fn profit_factor(&self) -> f64 {
        if self.gross_loss == 0.0 {
            return 0.0;
        }
        self.gross_profit / self.gross_loss
    }

    /// Probability-weighted average trade outcome.
    pub fn expectancy(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided == 0 {
            return 0.0;
        }
        let avg_win = if self.wins > 0 {
            self.gross_profit / self.wins as f64
        } else {
            0.0
        };
        let avg_loss = if self.losses > 0 {
            self.gross_loss / self.losses as f64
        } else {
            0.0
        };
        self.win_rate() * avg_win - (1.0 - self.win_rate()) * avg_loss
    }
}
