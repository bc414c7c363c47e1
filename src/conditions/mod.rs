//! Declarative condition evaluation against an indicator snapshot.
//!
//! Undefined indicator values fail closed: a condition over missing data
//! is never satisfied, and the reason names the gap. The `Unsupported`
//! variant is the one exception and always passes.

use crate::indicators::trend::alignment;
use crate::models::condition::{
    BollingerBand, ConditionSpec, MacdCheck, PricePosition, StochasticCheck,
};
use crate::models::indicators::{IndicatorSnapshot, TrendBias};
use crate::models::position::ExitReason;
use crate::models::strategy::{ExitCombinator, StrategyDefinition};

/// Pass/fail plus a human-readable reason.
#[derive(Debug, Clone)]
pub struct ConditionOutcome {
    pub passed: bool,
    pub reason: String,
}

impl ConditionOutcome {
    fn pass(reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            reason: reason.into(),
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: reason.into(),
        }
    }

    /// Undefined data is a fail with a reason naming the missing piece.
    fn undefined(what: &str) -> Self {
        Self::fail(format!("{} not available", what))
    }
}

/// Evaluate one condition against the shared snapshot and current price.
pub fn evaluate_condition(
    spec: &ConditionSpec,
    snapshot: &IndicatorSnapshot,
    price: f64,
) -> ConditionOutcome {
    match spec {
        ConditionSpec::Rsi { period, comparison } => {
            let Some(rsi) = snapshot.rsi.as_ref().filter(|r| r.period == *period) else {
                return ConditionOutcome::undefined(&format!("RSI({})", period));
            };
            let passed = comparison.check(rsi.value);
            outcome(
                passed,
                format!("RSI({}) {:.1} {}", period, rsi.value, comparison.describe()),
            )
        }
        ConditionSpec::Macd { check } => {
            let Some(macd) = snapshot.macd.as_ref() else {
                return ConditionOutcome::undefined("MACD");
            };
            let (passed, desc) = match check {
                MacdCheck::Bullish => (macd.macd > macd.signal, "MACD above signal"),
                MacdCheck::Bearish => (macd.macd < macd.signal, "MACD below signal"),
                MacdCheck::HistogramPositive => (macd.histogram > 0.0, "MACD histogram positive"),
                MacdCheck::HistogramNegative => (macd.histogram < 0.0, "MACD histogram negative"),
            };
            outcome(
                passed,
                format!(
                    "{} (macd {:.3}, signal {:.3}, hist {:.3})",
                    desc, macd.macd, macd.signal, macd.histogram
                ),
            )
        }
        ConditionSpec::Bollinger { band, position } => {
            let Some(bb) = snapshot.bollinger.as_ref() else {
                return ConditionOutcome::undefined("Bollinger bands");
            };
            let (band_value, band_name) = match band {
                BollingerBand::Upper => (bb.upper, "upper"),
                BollingerBand::Middle => (bb.middle, "middle"),
                BollingerBand::Lower => (bb.lower, "lower"),
            };
            let passed = match position {
                PricePosition::Above => price > band_value,
                PricePosition::Below => price < band_value,
            };
            outcome(
                passed,
                format!(
                    "price {:.2} vs {} band {:.2} ({:?})",
                    price, band_name, band_value, position
                ),
            )
        }
        ConditionSpec::BollingerWidth { comparison } => {
            let Some(width) = snapshot.bollinger.as_ref().and_then(|bb| bb.width) else {
                return ConditionOutcome::undefined("Bollinger width");
            };
            outcome(
                comparison.check(width),
                format!("BB width {:.1}% {}", width, comparison.describe()),
            )
        }
        ConditionSpec::Stochastic { check } => {
            let Some(stoch) = snapshot.stochastic.as_ref() else {
                return ConditionOutcome::undefined("stochastic");
            };
            let (passed, desc) = match check {
                StochasticCheck::K { comparison } => (
                    comparison.check(stoch.k),
                    format!("%K {:.1} {}", stoch.k, comparison.describe()),
                ),
                StochasticCheck::KAboveD => (
                    stoch.k > stoch.d,
                    format!("%K {:.1} above %D {:.1}", stoch.k, stoch.d),
                ),
                StochasticCheck::KBelowD => (
                    stoch.k < stoch.d,
                    format!("%K {:.1} below %D {:.1}", stoch.k, stoch.d),
                ),
            };
            outcome(passed, desc)
        }
        ConditionSpec::Adx {
            min_strength,
            direction,
        } => {
            let Some(adx) = snapshot.adx.as_ref() else {
                return ConditionOutcome::undefined("ADX");
            };
            let strong = adx.adx >= *min_strength;
            let directional = match direction {
                Some(TrendBias::Bullish) => adx.plus_di > adx.minus_di,
                Some(TrendBias::Bearish) => adx.minus_di > adx.plus_di,
                Some(TrendBias::Neutral) | None => true,
            };
            outcome(
                strong && directional,
                format!(
                    "ADX {:.1} (min {:.1}), +DI {:.1}, -DI {:.1}",
                    adx.adx, min_strength, adx.plus_di, adx.minus_di
                ),
            )
        }
        ConditionSpec::Volume { period, multiplier } => {
            let needed = *period as usize + 1;
            let volumes = &snapshot.recent_volumes;
            if volumes.len() < needed {
                return ConditionOutcome::undefined(&format!("{} bars of volume", needed));
            }
            let latest = volumes[volumes.len() - 1];
            let window = &volumes[volumes.len() - needed..volumes.len() - 1];
            let average = window.iter().sum::<f64>() / *period as f64;
            if average <= 0.0 {
                return ConditionOutcome::undefined("volume average");
            }
            outcome(
                latest > average * multiplier,
                format!(
                    "volume {:.0} vs {:.1}x {}-bar average {:.0}",
                    latest, multiplier, period, average
                ),
            )
        }
        ConditionSpec::RateOfChange { period, comparison } => {
            let Some(roc) = snapshot.roc.as_ref().filter(|r| r.period == *period) else {
                return ConditionOutcome::undefined(&format!("ROC({})", period));
            };
            outcome(
                comparison.check(roc.value),
                format!("ROC({}) {:.2}% {}", period, roc.value, comparison.describe()),
            )
        }
        ConditionSpec::Divergence { expected } => {
            let Some(div) = snapshot.divergence.as_ref() else {
                return ConditionOutcome::undefined("RSI divergence");
            };
            outcome(
                div.signal == *expected,
                format!("divergence {:?} (want {:?})", div.signal, expected),
            )
        }
        ConditionSpec::MaAlignment {
            short,
            medium,
            long,
            expected,
        } => {
            let (Some(s), Some(m), Some(l)) = (
                snapshot.sma(*short),
                snapshot.sma(*medium),
                snapshot.sma(*long),
            ) else {
                return ConditionOutcome::undefined("MA ladder");
            };
            let Some(bias) = alignment::alignment_of(s, m, l) else {
                return ConditionOutcome::undefined("MA alignment");
            };
            outcome(
                bias == *expected,
                format!(
                    "MA alignment {:?} (SMA{} {:.2}, SMA{} {:.2}, SMA{} {:.2})",
                    bias, short, s, medium, m, long, l
                ),
            )
        }
        ConditionSpec::PriceVsMa { period, position } => {
            let Some(ma) = snapshot.sma(*period) else {
                return ConditionOutcome::undefined(&format!("SMA({})", period));
            };
            let passed = match position {
                PricePosition::Above => price > ma,
                PricePosition::Below => price < ma,
            };
            outcome(
                passed,
                format!("price {:.2} vs SMA({}) {:.2} ({:?})", price, period, ma, position),
            )
        }
        ConditionSpec::Unsupported => {
            ConditionOutcome::pass("unsupported condition type, vacuous pass")
        }
    }
}

fn outcome(passed: bool, reason: String) -> ConditionOutcome {
    if passed {
        ConditionOutcome::pass(reason)
    } else {
        ConditionOutcome::fail(reason)
    }
}

/// Result of an entry-list evaluation.
#[derive(Debug, Clone)]
pub struct EntryEvaluation {
    pub passed: bool,
    pub reasons: Vec<String>,
}

/// Check the price gate, then every entry condition (implicit ALL).
/// The gate short-circuits: nothing else is evaluated when it fails.
pub fn evaluate_entry(
    strategy: &StrategyDefinition,
    snapshot: &IndicatorSnapshot,
    price: f64,
) -> EntryEvaluation {
    if !strategy.price_range.contains(price) {
        return EntryEvaluation {
            passed: false,
            reasons: vec![format!(
                "price {:.2} outside [{:.2}, {:.2}]",
                price, strategy.price_range.min, strategy.price_range.max
            )],
        };
    }

    let mut reasons = Vec::with_capacity(strategy.entry_conditions.len());
    let mut passed = true;
    for spec in &strategy.entry_conditions {
        let result = evaluate_condition(spec, snapshot, price);
        if !result.passed {
            passed = false;
        }
        reasons.push(result.reason);
        if !passed {
            break;
        }
    }

    EntryEvaluation { passed, reasons }
}

/// Evaluate the strategy's exit list under its combinator.
///
/// ANY: the first satisfied concrete condition fires with its family's
/// exit reason. Unsupported variants are skipped here — a vacuous pass
/// must not close positions on its own. ALL: every condition must be
/// satisfied (Unsupported counts as satisfied); the reason is the first
/// concrete family's exit, or a generic indicator exit.
pub fn evaluate_exit_conditions(
    strategy: &StrategyDefinition,
    snapshot: &IndicatorSnapshot,
    price: f64,
) -> Option<(ExitReason, String)> {
    if strategy.exit_conditions.is_empty() {
        return None;
    }

    match strategy.exit_combinator {
        ExitCombinator::Any => {
            for spec in &strategy.exit_conditions {
                if matches!(spec, ConditionSpec::Unsupported) {
                    continue;
                }
                let result = evaluate_condition(spec, snapshot, price);
                if result.passed {
                    return Some((exit_reason_for(spec), result.reason));
                }
            }
            None
        }
        ExitCombinator::All => {
            let mut first_reason: Option<(ExitReason, String)> = None;
            for spec in &strategy.exit_conditions {
                let result = evaluate_condition(spec, snapshot, price);
                if !result.passed {
                    return None;
                }
                if first_reason.is_none() && !matches!(spec, ConditionSpec::Unsupported) {
                    first_reason = Some((exit_reason_for(spec), result.reason));
                }
            }
            Some(first_reason.unwrap_or((
                ExitReason::IndicatorExit,
                "all exit conditions satisfied".to_string(),
            )))
        }
    }
}

/// Family-named exit reason for a satisfied exit condition.
pub fn exit_reason_for(spec: &ConditionSpec) -> ExitReason {
    match spec {
        ConditionSpec::Rsi { .. } => ExitReason::RsiExit,
        ConditionSpec::Macd { .. } => ExitReason::MacdExit,
        ConditionSpec::Bollinger { .. } | ConditionSpec::BollingerWidth { .. } => {
            ExitReason::BbExit
        }
        ConditionSpec::Stochastic { .. } => ExitReason::StochasticExit,
        ConditionSpec::Adx { .. } => ExitReason::AdxExit,
        ConditionSpec::Volume { .. } => ExitReason::VolumeExit,
        ConditionSpec::RateOfChange { .. } => ExitReason::RocExit,
        ConditionSpec::Divergence { .. } => ExitReason::DivergenceExit,
        ConditionSpec::MaAlignment { .. } | ConditionSpec::PriceVsMa { .. } => ExitReason::MaExit,
        ConditionSpec::Unsupported => ExitReason::IndicatorExit,
    }
}
