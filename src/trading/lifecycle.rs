//! Position exit evaluation.
//!
//! Each tick every open position runs the exit checks in a fixed priority
//! order; the first match wins and the remaining checks are skipped:
//!
//! 1. time exit
//! 2. profit target
//! 3. the strategy's stop-loss policy
//! 4. the indicator exit list
//!
//! Checks that need the indicator snapshot are skipped when no fresh
//! snapshot is available: undefined data is never a reason to exit.

use chrono::{DateTime, Utc};

use crate::conditions;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::position::{ExitReason, Position};
use crate::models::strategy::{StopLossPolicy, StrategyDefinition};

#[derive(Debug, Clone)]
pub struct ExitDecision {
    pub reason: ExitReason,
    pub detail: String,
}

/// Refresh the live mark fields from the latest price.
pub fn refresh_mark(position: &mut Position, price: f64) {
    position.current_price = price;
    position.current_value = position.shares as f64 * price;
    position.unrealized_pl = (price - position.entry_price) * position.shares as f64;
    position.unrealized_pl_pct = Position::unrealized_pct(position.entry_price, price);
}

/// Run the exit checks for one tick.
///
/// Always updates the high-water mark and live mark fields, whether or
/// not an exit fires; the caller persists the position either way.
pub fn evaluate_exit(
    position: &mut Position,
    strategy: &StrategyDefinition,
    price: f64,
    snapshot: Option<&IndicatorSnapshot>,
    now: DateTime<Utc>,
) -> Option<ExitDecision> {
    // The trailing high-water mark ratchets on every tick regardless of
    // the exit outcome.
    if price > position.high_water_mark {
        position.high_water_mark = price;
    }
    refresh_mark(position, price);

    // 1. Time exit.
    if let Some(max_days) = strategy.max_hold_days {
        let held = (now - position.entry_time).num_days();
        if held >= max_days {
            return Some(ExitDecision {
                reason: ExitReason::TimeExit,
                detail: format!("held {} days (max {})", held, max_days),
            });
        }
    }

    // 2. Profit target.
    if let Some(target) = strategy.profit_target_pct {
        if position.unrealized_pl_pct >= target {
            return Some(ExitDecision {
                reason: ExitReason::ProfitTarget,
                detail: format!(
                    "unrealized {:.2}% >= target {:.2}%",
                    position.unrealized_pl_pct, target
                ),
            });
        }
    }

    // 3. Stop-loss policy.
    if let Some(decision) = check_stop_loss(position, &strategy.stop_loss, price, snapshot) {
        return Some(decision);
    }

    // 4. Indicator exit list.
    if let Some(snapshot) = snapshot {
        if let Some((reason, detail)) =
            conditions::evaluate_exit_conditions(strategy, snapshot, price)
        {
            return Some(ExitDecision { reason, detail });
        }
    }

    None
}

fn check_stop_loss(
    position: &Position,
    policy: &StopLossPolicy,
    price: f64,
    snapshot: Option<&IndicatorSnapshot>,
) -> Option<ExitDecision> {
    match policy {
        StopLossPolicy::None => None,
        StopLossPolicy::FixedPercent { percent } => {
            if position.unrealized_pl_pct <= -percent {
                Some(ExitDecision {
                    reason: ExitReason::StopLoss,
                    detail: format!(
                        "unrealized {:.2}% <= -{:.2}%",
                        position.unrealized_pl_pct, percent
                    ),
                })
            } else {
                None
            }
        }
        StopLossPolicy::AtrFixed { .. } => {
            let stop = position.atr_stop_price?;
            if price <= stop {
                Some(ExitDecision {
                    reason: ExitReason::AtrStop,
                    detail: format!("price {:.2} <= ATR stop {:.2}", price, stop),
                })
            } else {
                None
            }
        }
        StopLossPolicy::AtrTrailing { multiplier } => {
            let entry_atr = position.entry_atr?;
            let stop = position.high_water_mark - multiplier * entry_atr;
            if price <= stop {
                Some(ExitDecision {
                    reason: ExitReason::AtrTrailingStop,
                    detail: format!(
                        "price {:.2} <= trailing stop {:.2} (high water {:.2})",
                        price, stop, position.high_water_mark
                    ),
                })
            } else {
                None
            }
        }
        StopLossPolicy::BollingerMiddle => {
            let middle = snapshot?.bollinger.as_ref()?.middle;
            if price < middle {
                Some(ExitDecision {
                    reason: ExitReason::BbMiddleStop,
                    detail: format!("price {:.2} < middle band {:.2}", price, middle),
                })
            } else {
                None
            }
        }
        StopLossPolicy::MacdTrough => {
            let entry_histogram = position.entry_macd_histogram?;
            let histogram = snapshot?.macd.as_ref()?.histogram;
            if histogram < entry_histogram {
                Some(ExitDecision {
                    reason: ExitReason::MacdTroughStop,
                    detail: format!(
                        "histogram {:.3} < entry histogram {:.3}",
                        histogram, entry_histogram
                    ),
                })
            } else {
                None
            }
        }
    }
}

/// Precompute the entry-time working state a stop policy needs.
///
/// Returns (entry ATR, fixed ATR stop price, entry MACD histogram).
pub fn entry_stop_state(
    policy: &StopLossPolicy,
    entry_price: f64,
    snapshot: &IndicatorSnapshot,
) -> (Option<f64>, Option<f64>, Option<f64>) {
    let atr = snapshot.atr.as_ref().map(|a| a.value);
    let histogram = snapshot.macd.as_ref().map(|m| m.histogram);
    match policy {
        StopLossPolicy::AtrFixed { multiplier } => {
            let stop = atr.map(|a| entry_price - multiplier * a);
            (atr, stop, None)
        }
        StopLossPolicy::AtrTrailing { .. } => (atr, None, None),
        StopLossPolicy::MacdTrough => (None, None, histogram),
        _ => (None, None, None),
    }
}
