//! Unit tests for exit evaluation and stop policies

use chrono::{Duration, Utc};
use swingforge::models::condition::{Comparison, ConditionSpec};
use swingforge::models::indicators::{
    AtrIndicator, BollingerIndicator, IndicatorSnapshot, MacdIndicator, RsiIndicator,
};
use swingforge::models::position::{ExitReason, Position};
use swingforge::models::strategy::{
    ExitCombinator, PriceRange, StopLossPolicy, StrategyDefinition,
};
use swingforge::trading::lifecycle::{entry_stop_state, evaluate_exit, refresh_mark};

fn position(entry_price: f64, days_held: i64) -> Position {
    Position {
        id: Some(1),
        simulation_id: 1,
        trade_id: 1,
        symbol: "AAPL".to_string(),
        shares: 10,
        entry_price,
        entry_time: Utc::now() - Duration::days(days_held),
        current_price: entry_price,
        current_value: entry_price * 10.0,
        unrealized_pl: 0.0,
        unrealized_pl_pct: 0.0,
        high_water_mark: entry_price,
        entry_atr: None,
        atr_stop_price: None,
        entry_macd_histogram: None,
    }
}

fn strategy() -> StrategyDefinition {
    StrategyDefinition {
        key: "test".to_string(),
        name: "Test".to_string(),
        active: true,
        price_range: PriceRange {
            min: 25.0,
            max: 100.0,
        },
        entry_conditions: Vec::new(),
        exit_conditions: Vec::new(),
        exit_combinator: ExitCombinator::Any,
        profit_target_pct: None,
        stop_loss: StopLossPolicy::None,
        max_hold_days: None,
        position_size_pct: 0.10,
        initial_capital: 10_000.0,
        trade_limit: 100,
    }
}

#[test]
fn refresh_mark_updates_live_fields() {
    let mut position = position(50.0, 1);
    refresh_mark(&mut position, 55.0);
    assert_eq!(position.current_price, 55.0);
    assert_eq!(position.current_value, 550.0);
    assert_eq!(position.unrealized_pl, 50.0);
    assert_eq!(position.unrealized_pl_pct, 10.0);
}

#[test]
fn time_exit_takes_priority_over_profit_target() {
    let mut strategy = strategy();
    strategy.max_hold_days = Some(10);
    strategy.profit_target_pct = Some(6.0);

    // Both conditions hold; the time check runs first.
    let mut position = position(50.0, 10);
    let decision = evaluate_exit(&mut position, &strategy, 55.0, None, Utc::now()).unwrap();
    assert_eq!(decision.reason, ExitReason::TimeExit);
}

#[test]
fn profit_target_fires_at_threshold() {
    let mut strategy = strategy();
    strategy.profit_target_pct = Some(6.0);

    let mut position = position(50.0, 1);
    assert!(evaluate_exit(&mut position, &strategy, 52.9, None, Utc::now()).is_none());

    let decision = evaluate_exit(&mut position, &strategy, 53.0, None, Utc::now()).unwrap();
    assert_eq!(decision.reason, ExitReason::ProfitTarget);
}

#[test]
fn fixed_percent_stop_fires_at_threshold() {
    let mut strategy = strategy();
    strategy.stop_loss = StopLossPolicy::FixedPercent { percent: 3.0 };

    let mut position = position(50.0, 1);
    assert!(evaluate_exit(&mut position, &strategy, 48.6, None, Utc::now()).is_none());

    let decision = evaluate_exit(&mut position, &strategy, 48.5, None, Utc::now()).unwrap();
    assert_eq!(decision.reason, ExitReason::StopLoss);
}

#[test]
fn atr_fixed_stop_uses_precomputed_price() {
    let mut strategy = strategy();
    strategy.stop_loss = StopLossPolicy::AtrFixed { multiplier: 1.5 };

    let mut position = position(50.0, 1);
    position.entry_atr = Some(2.0);
    position.atr_stop_price = Some(47.0);

    assert!(evaluate_exit(&mut position, &strategy, 47.5, None, Utc::now()).is_none());
    let decision = evaluate_exit(&mut position, &strategy, 47.0, None, Utc::now()).unwrap();
    assert_eq!(decision.reason, ExitReason::AtrStop);
}

#[test]
fn atr_trailing_stop_follows_the_high_water_mark() {
    let mut strategy = strategy();
    strategy.stop_loss = StopLossPolicy::AtrTrailing { multiplier: 2.0 };

    let mut position = position(50.0, 1);
    position.entry_atr = Some(2.0);

    // Rally to $60 ratchets the mark; the stop trails at 60 - 4 = 56.
    assert!(evaluate_exit(&mut position, &strategy, 60.0, None, Utc::now()).is_none());
    assert_eq!(position.high_water_mark, 60.0);

    assert!(evaluate_exit(&mut position, &strategy, 56.5, None, Utc::now()).is_none());
    // The pullback does not lower the mark.
    assert_eq!(position.high_water_mark, 60.0);

    let decision = evaluate_exit(&mut position, &strategy, 55.9, None, Utc::now()).unwrap();
    assert_eq!(decision.reason, ExitReason::AtrTrailingStop);
}

#[test]
fn atr_stops_without_entry_state_never_fire() {
    let mut strategy = strategy();
    strategy.stop_loss = StopLossPolicy::AtrTrailing { multiplier: 2.0 };

    // No entry ATR recorded; the stop is silently inert.
    let mut position = position(50.0, 1);
    assert!(evaluate_exit(&mut position, &strategy, 30.0, None, Utc::now()).is_none());
}

#[test]
fn bollinger_middle_stop_needs_a_snapshot() {
    let mut strategy = strategy();
    strategy.stop_loss = StopLossPolicy::BollingerMiddle;

    let mut position = position(50.0, 1);
    assert!(evaluate_exit(&mut position, &strategy, 45.0, None, Utc::now()).is_none());

    let mut snapshot = IndicatorSnapshot::new("AAPL", 45.0);
    snapshot.bollinger = Some(BollingerIndicator {
        upper: 55.0,
        middle: 48.0,
        lower: 41.0,
        width: Some(29.2),
        period: 20,
        k: 2.0,
    });
    let decision =
        evaluate_exit(&mut position, &strategy, 45.0, Some(&snapshot), Utc::now()).unwrap();
    assert_eq!(decision.reason, ExitReason::BbMiddleStop);
}

#[test]
fn macd_trough_stop_compares_against_entry_histogram() {
    let mut strategy = strategy();
    strategy.stop_loss = StopLossPolicy::MacdTrough;

    let mut position = position(50.0, 1);
    position.entry_macd_histogram = Some(0.5);

    let mut snapshot = IndicatorSnapshot::new("AAPL", 50.0);
    snapshot.macd = Some(MacdIndicator {
        macd: 1.0,
        signal: 0.4,
        histogram: 0.6,
        period: Some((12, 26, 9)),
    });
    assert!(evaluate_exit(&mut position, &strategy, 50.0, Some(&snapshot), Utc::now()).is_none());

    snapshot.macd.as_mut().unwrap().histogram = 0.3;
    let decision =
        evaluate_exit(&mut position, &strategy, 50.0, Some(&snapshot), Utc::now()).unwrap();
    assert_eq!(decision.reason, ExitReason::MacdTroughStop);
}

#[test]
fn indicator_exits_run_last_and_need_a_snapshot() {
    let mut strategy = strategy();
    strategy.exit_conditions = vec![ConditionSpec::Rsi {
        period: 14,
        comparison: Comparison::Above { value: 65.0 },
    }];

    let mut position = position(50.0, 1);
    // No snapshot: missing data is never a reason to exit.
    assert!(evaluate_exit(&mut position, &strategy, 50.0, None, Utc::now()).is_none());

    let mut snapshot = IndicatorSnapshot::new("AAPL", 50.0);
    snapshot.rsi = Some(RsiIndicator {
        value: 70.0,
        period: 14,
    });
    let decision =
        evaluate_exit(&mut position, &strategy, 50.0, Some(&snapshot), Utc::now()).unwrap();
    assert_eq!(decision.reason, ExitReason::RsiExit);
}

#[test]
fn entry_stop_state_per_policy() {
    let mut snapshot = IndicatorSnapshot::new("AAPL", 50.0);
    snapshot.atr = Some(AtrIndicator {
        value: 2.0,
        period: 14,
    });
    snapshot.macd = Some(MacdIndicator {
        macd: 1.0,
        signal: 0.4,
        histogram: 0.6,
        period: Some((12, 26, 9)),
    });

    let (atr, stop, hist) =
        entry_stop_state(&StopLossPolicy::AtrFixed { multiplier: 1.5 }, 50.0, &snapshot);
    assert_eq!(atr, Some(2.0));
    assert_eq!(stop, Some(47.0));
    assert_eq!(hist, None);

    let (atr, stop, hist) =
        entry_stop_state(&StopLossPolicy::AtrTrailing { multiplier: 2.0 }, 50.0, &snapshot);
    assert_eq!(atr, Some(2.0));
    assert_eq!(stop, None);
    assert_eq!(hist, None);

    let (atr, stop, hist) = entry_stop_state(&StopLossPolicy::MacdTrough, 50.0, &snapshot);
    assert_eq!(atr, None);
    assert_eq!(stop, None);
    assert_eq!(hist, Some(0.6));

    let (atr, stop, hist) = entry_stop_state(&StopLossPolicy::None, 50.0, &snapshot);
    assert_eq!((atr, stop, hist), (None, None, None));
}
