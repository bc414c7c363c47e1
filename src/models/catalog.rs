//! Built-in strategy catalog.
//!
//! Eight swing strategies over the closed condition vocabulary, all gated
//! to the $25-$100 price band. Seeded into an empty store at startup.

use super::condition::{
    BollingerBand, Comparison, ConditionSpec, MacdCheck, PricePosition, StochasticCheck,
};
use super::indicators::TrendBias;
use super::strategy::{ExitCombinator, PriceRange, StopLossPolicy, StrategyDefinition};

const PRICE_GATE: PriceRange = PriceRange {
    min: 25.0,
    max: 100.0,
};
const DEFAULT_CAPITAL: f64 = 10_000.0;
const DEFAULT_TRADE_LIMIT: u32 = 100;

/// All built-in strategies, keys stable across releases.
pub fn builtin_strategies() -> Vec<StrategyDefinition> {
    vec![
        rsi_stochastic_oversold(),
        adx_trend_pullback(),
        bollinger_squeeze(),
        macd_bb_volume(),
        stochastic_rsi_sync(),
        rsi_mean_reversion(),
        macd_momentum(),
        volume_breakout(),
    ]
}

fn base(key: &str, name: &str) -> StrategyDefinition {
    StrategyDefinition {
        key: key.to_string(),
        name: name.to_string(),
        active: true,
        price_range: PRICE_GATE,
        entry_conditions: Vec::new(),
        exit_conditions: Vec::new(),
        exit_combinator: ExitCombinator::Any,
        profit_target_pct: None,
        stop_loss: StopLossPolicy::None,
        max_hold_days: None,
        position_size_pct: 0.10,
        initial_capital: DEFAULT_CAPITAL,
        trade_limit: DEFAULT_TRADE_LIMIT,
    }
}

fn rsi_stochastic_oversold() -> StrategyDefinition {
    StrategyDefinition {
        entry_conditions: vec![
            ConditionSpec::Rsi {
                period: 14,
                comparison: Comparison::Below { value: 40.0 },
            },
            ConditionSpec::Stochastic {
                check: StochasticCheck::K {
                    comparison: Comparison::Below { value: 30.0 },
                },
            },
            ConditionSpec::Macd {
                check: MacdCheck::Bullish,
            },
        ],
        exit_conditions: vec![ConditionSpec::Rsi {
            period: 14,
            comparison: Comparison::Above { value: 65.0 },
        }],
        profit_target_pct: Some(8.0),
        stop_loss: StopLossPolicy::FixedPercent { percent: 4.0 },
        max_hold_days: Some(10),
        ..base("rsi_stochastic_oversold", "RSI-Stochastic Double Oversold")
    }
}

fn adx_trend_pullback() -> StrategyDefinition {
    StrategyDefinition {
        entry_conditions: vec![
            ConditionSpec::Adx {
                min_strength: 20.0,
                direction: Some(TrendBias::Bullish),
            },
            ConditionSpec::PriceVsMa {
                period: 50,
                position: PricePosition::Above,
            },
        ],
        exit_conditions: vec![ConditionSpec::PriceVsMa {
            period: 50,
            position: PricePosition::Below,
        }],
        profit_target_pct: Some(10.0),
        stop_loss: StopLossPolicy::AtrTrailing { multiplier: 2.0 },
        max_hold_days: Some(15),
        ..base("adx_trend_pullback", "ADX Trend + MA Pullback")
    }
}

fn bollinger_squeeze() -> StrategyDefinition {
    StrategyDefinition {
        entry_conditions: vec![
            ConditionSpec::BollingerWidth {
                comparison: Comparison::Below { value: 15.0 },
            },
            ConditionSpec::Bollinger {
                band: BollingerBand::Upper,
                position: PricePosition::Above,
            },
            ConditionSpec::RateOfChange {
                period: 12,
                comparison: Comparison::Above { value: 0.0 },
            },
            ConditionSpec::Volume {
                period: 20,
                multiplier: 1.5,
            },
        ],
        profit_target_pct: Some(12.0),
        stop_loss: StopLossPolicy::BollingerMiddle,
        max_hold_days: Some(10),
        ..base("bollinger_squeeze", "Bollinger Squeeze Breakout")
    }
}

fn macd_bb_volume() -> StrategyDefinition {
    StrategyDefinition {
        entry_conditions: vec![
            ConditionSpec::Macd {
                check: MacdCheck::Bullish,
            },
            ConditionSpec::Bollinger {
                band: BollingerBand::Middle,
                position: PricePosition::Above,
            },
            ConditionSpec::Rsi {
                period: 14,
                comparison: Comparison::Between {
                    min: 40.0,
                    max: 70.0,
                },
            },
            ConditionSpec::Volume {
                period: 20,
                multiplier: 1.2,
            },
        ],
        exit_conditions: vec![ConditionSpec::Macd {
            check: MacdCheck::Bearish,
        }],
        profit_target_pct: Some(8.0),
        stop_loss: StopLossPolicy::MacdTrough,
        max_hold_days: Some(12),
        ..base("macd_bb_volume", "MACD-BB-Volume Triple Filter")
    }
}

fn stochastic_rsi_sync() -> StrategyDefinition {
    StrategyDefinition {
        entry_conditions: vec![
            ConditionSpec::Stochastic {
                check: StochasticCheck::KAboveD,
            },
            ConditionSpec::Rsi {
                period: 14,
                comparison: Comparison::Between {
                    min: 30.0,
                    max: 55.0,
                },
            },
            ConditionSpec::PriceVsMa {
                period: 50,
                position: PricePosition::Above,
            },
        ],
        exit_conditions: vec![ConditionSpec::Stochastic {
            check: StochasticCheck::K {
                comparison: Comparison::Above { value: 80.0 },
            },
        }],
        profit_target_pct: Some(9.0),
        stop_loss: StopLossPolicy::FixedPercent { percent: 5.0 },
        max_hold_days: Some(10),
        ..base("stochastic_rsi_sync", "Stochastic-RSI Momentum Sync")
    }
}

fn rsi_mean_reversion() -> StrategyDefinition {
    StrategyDefinition {
        entry_conditions: vec![ConditionSpec::Rsi {
            period: 14,
            comparison: Comparison::Below { value: 35.0 },
        }],
        exit_conditions: vec![ConditionSpec::Rsi {
            period: 14,
            comparison: Comparison::Above { value: 55.0 },
        }],
        profit_target_pct: Some(6.0),
        stop_loss: StopLossPolicy::FixedPercent { percent: 3.0 },
        max_hold_days: Some(7),
        ..base("rsi_mean_reversion", "RSI Mean Reversion")
    }
}

fn macd_momentum() -> StrategyDefinition {
    StrategyDefinition {
        entry_conditions: vec![
            ConditionSpec::Macd {
                check: MacdCheck::Bullish,
            },
            ConditionSpec::PriceVsMa {
                period: 50,
                position: PricePosition::Above,
            },
        ],
        exit_conditions: vec![ConditionSpec::Macd {
            check: MacdCheck::Bearish,
        }],
        profit_target_pct: Some(10.0),
        stop_loss: StopLossPolicy::AtrFixed { multiplier: 1.5 },
        max_hold_days: Some(20),
        ..base("macd_momentum", "MACD Momentum Crossover")
    }
}

fn volume_breakout() -> StrategyDefinition {
    StrategyDefinition {
        entry_conditions: vec![
            ConditionSpec::Volume {
                period: 10,
                multiplier: 2.0,
            },
            ConditionSpec::RateOfChange {
                period: 12,
                comparison: Comparison::Above { value: 2.0 },
            },
        ],
        exit_conditions: vec![ConditionSpec::RateOfChange {
            period: 12,
            comparison: Comparison::Below { value: 0.0 },
        }],
        profit_target_pct: Some(15.0),
        stop_loss: StopLossPolicy::AtrTrailing { multiplier: 2.5 },
        max_hold_days: Some(8),
        ..base("volume_breakout", "Volume Breakout Scanner")
    }
}
