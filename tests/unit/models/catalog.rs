//! Unit tests for the built-in strategy catalog

use std::collections::HashSet;

use swingforge::models::catalog::builtin_strategies;
use swingforge::models::strategy::StopLossPolicy;

#[test]
fn catalog_has_eight_strategies_with_unique_keys() {
    let strategies = builtin_strategies();
    assert_eq!(strategies.len(), 8);
    let keys: HashSet<&str> = strategies.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys.len(), 8);
}

#[test]
fn every_strategy_is_fully_specified() {
    for strategy in builtin_strategies() {
        assert!(strategy.active, "{} should start active", strategy.key);
        assert!(
            !strategy.entry_conditions.is_empty(),
            "{} has no entry conditions",
            strategy.key
        );
        assert_eq!(strategy.price_range.min, 25.0);
        assert_eq!(strategy.price_range.max, 100.0);
        assert_eq!(strategy.position_size_pct, 0.10);
        assert_eq!(strategy.initial_capital, 10_000.0);
        assert_eq!(strategy.trade_limit, 100);
        assert!(strategy.max_hold_days.is_some(), "{}", strategy.key);
        assert!(strategy.profit_target_pct.is_some(), "{}", strategy.key);
    }
}

#[test]
fn stop_loss_policies_cover_the_catalog() {
    let strategies = builtin_strategies();
    let policy_of = |key: &str| {
        strategies
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.stop_loss)
            .unwrap()
    };
    assert_eq!(
        policy_of("rsi_mean_reversion"),
        StopLossPolicy::FixedPercent { percent: 3.0 }
    );
    assert_eq!(
        policy_of("adx_trend_pullback"),
        StopLossPolicy::AtrTrailing { multiplier: 2.0 }
    );
    assert_eq!(policy_of("bollinger_squeeze"), StopLossPolicy::BollingerMiddle);
    assert_eq!(policy_of("macd_bb_volume"), StopLossPolicy::MacdTrough);
    assert_eq!(
        policy_of("macd_momentum"),
        StopLossPolicy::AtrFixed { multiplier: 1.5 }
    );
}

#[test]
fn catalog_serializes_to_json_and_back() {
    for strategy in builtin_strategies() {
        let json = serde_json::to_string(&strategy).unwrap();
        let back: swingforge::models::strategy::StrategyDefinition =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back.key, strategy.key);
        assert_eq!(back.entry_conditions, strategy.entry_conditions);
        assert_eq!(back.exit_conditions, strategy.exit_conditions);
    }
}
