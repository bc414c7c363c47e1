//! Time-boxed batch run: exits first, then entries, then signal age-out.
//!
//! One invocation per external trigger. The wall-clock budget is checked
//! at loop boundaries; when it runs out the run stops cleanly and returns
//! partial results. Per-record failures land in the summary's bounded
//! error list and never abort the run.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Utc};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::config;
use crate::db::{OpenRequest, SimStore};
use crate::models::account::Simulation;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::position::ExitFill;
use crate::models::signal::Signal;
use crate::models::strategy::StrategyDefinition;
use crate::models::summary::{BatchSummary, ErrorList, DEFAULT_ERROR_CAP};
use crate::services::MarketDataProvider;

use super::quote_cache::QuoteCache;
use super::{capital, lifecycle};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Hard wall-clock budget for the whole run.
    pub budget: Duration,
    pub quote_concurrency: usize,
    pub quote_batch_delay: Duration,
    /// Pending signals pulled per strategy per run.
    pub signals_per_strategy: usize,
    pub signal_retention_days: i64,
    pub snapshot_max_age_hours: i64,
    pub error_cap: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            budget: Duration::from_millis(55_000),
            quote_concurrency: 5,
            quote_batch_delay: Duration::from_millis(250),
            signals_per_strategy: 5,
            signal_retention_days: 30,
            snapshot_max_age_hours: 72,
            error_cap: DEFAULT_ERROR_CAP,
        }
    }
}

impl BatchConfig {
    pub fn from_env() -> Self {
        Self {
            budget: Duration::from_millis(config::get_batch_budget_ms()),
            quote_concurrency: config::get_quote_concurrency(),
            quote_batch_delay: Duration::from_millis(config::get_quote_batch_delay_ms()),
            signals_per_strategy: config::get_signals_per_strategy(),
            signal_retention_days: config::get_signal_retention_days(),
            snapshot_max_age_hours: config::get_snapshot_max_age_hours(),
            error_cap: DEFAULT_ERROR_CAP,
        }
    }
}

pub struct BatchRunner {
    store: Arc<dyn SimStore>,
    provider: Arc<dyn MarketDataProvider>,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(
        store: Arc<dyn SimStore>,
        provider: Arc<dyn MarketDataProvider>,
        config: BatchConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Run one batch. Never fails as a whole: store errors on individual
    /// records are aggregated and the summary is always returned.
    pub async fn run(&self) -> BatchSummary {
        let started = Instant::now();
        let deadline = started + self.config.budget;
        let mut summary = BatchSummary {
            errors: ErrorList::with_cap(self.config.error_cap),
            ..Default::default()
        };
        // Quotes older than the run are useless; keep a short TTL.
        let mut cache = QuoteCache::new(ChronoDuration::minutes(5));

        self.exit_phase(deadline, &mut cache, &mut summary).await;

        if Instant::now() < deadline {
            self.entry_phase(deadline, &mut cache, &mut summary).await;
        } else {
            summary.deadline_hit = true;
        }

        let cutoff = Utc::now() - ChronoDuration::days(self.config.signal_retention_days);
        match self.store.age_out_signals(cutoff).await {
            Ok(removed) => summary.signals_aged_out = removed,
            Err(e) => summary.errors.push(format!("age-out failed: {}", e)),
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            positions_checked = summary.positions_checked,
            positions_closed = summary.positions_closed,
            trades_opened = summary.trades_opened,
            signals_aged_out = summary.signals_aged_out,
            errors = summary.errors.total(),
            deadline_hit = summary.deadline_hit,
            duration_ms = summary.duration_ms,
            "batch run complete"
        );
        summary
    }

    /// Phase 1: evaluate exits for every open position. Positions are
    /// shuffled so coverage is fair across runs when the budget cuts the
    /// loop short.
    async fn exit_phase(
        &self,
        deadline: Instant,
        cache: &mut QuoteCache,
        summary: &mut BatchSummary,
    ) {
        let mut positions = match self.store.list_open_positions().await {
            Ok(p) => p,
            Err(e) => {
                summary.errors.push(format!("list positions failed: {}", e));
                return;
            }
        };
        if positions.is_empty() {
            return;
        }
        positions.shuffle(&mut rand::thread_rng());

        let strategies = match self.strategy_map().await {
            Ok(s) => s,
            Err(e) => {
                summary.errors.push(format!("load strategies failed: {}", e));
                return;
            }
        };
        let simulations = match self.simulation_map().await {
            Ok(s) => s,
            Err(e) => {
                summary
                    .errors
                    .push(format!("load simulations failed: {}", e));
                return;
            }
        };

        let symbols: Vec<String> = positions.iter().map(|p| p.symbol.clone()).collect();
        cache
            .prefetch(
                self.provider.as_ref(),
                &symbols,
                self.config.quote_concurrency,
                self.config.quote_batch_delay,
                deadline,
            )
            .await;

        let now = Utc::now();
        for mut position in positions {
            if Instant::now() >= deadline {
                summary.deadline_hit = true;
                break;
            }
            summary.positions_checked += 1;

            let Some(strategy) = simulations
                .get(&position.simulation_id)
                .and_then(|sim| strategies.get(&sim.strategy_key))
            else {
                summary.errors.push(format!(
                    "no strategy for position {} ({})",
                    position.id.unwrap_or(0),
                    position.symbol
                ));
                continue;
            };

            let Some(price) = cache.get(&position.symbol).map(|q| q.price) else {
                summary.positions_skipped_no_quote += 1;
                continue;
            };

            let snapshot = self.fresh_snapshot(&position.symbol).await;

            match lifecycle::evaluate_exit(&mut position, strategy, price, snapshot.as_ref(), now)
            {
                Some(decision) => {
                    let fill = ExitFill {
                        price,
                        time: now,
                        reason: decision.reason,
                    };
                    match self.store.close_position(&position, &fill).await {
                        Ok(trade) => {
                            summary.positions_closed += 1;
                            info!(
                                symbol = %position.symbol,
                                reason = decision.reason.as_str(),
                                detail = %decision.detail,
                                realized_pl = trade.realized_pl.unwrap_or(0.0),
                                "position closed"
                            );
                        }
                        Err(e) => {
                            summary
                                .errors
                                .push(format!("close {} failed: {}", position.symbol, e));
                        }
                    }
                }
                None => {
                    if let Err(e) = self.store.update_position_mark(&position).await {
                        summary
                            .errors
                            .push(format!("mark {} failed: {}", position.symbol, e));
                    }
                }
            }
        }
    }

    /// Phase 2: convert pending signals into positions, round-robin
    /// across strategies so no single strategy starves the others.
    async fn entry_phase(
        &self,
        deadline: Instant,
        cache: &mut QuoteCache,
        summary: &mut BatchSummary,
    ) {
        let strategies = match self.store.list_active_strategies().await {
            Ok(s) => s,
            Err(e) => {
                summary.errors.push(format!("load strategies failed: {}", e));
                return;
            }
        };
        let mut simulations: HashMap<String, Simulation> = match self.store.list_simulations().await
        {
            Ok(sims) => sims
                .into_iter()
                .map(|s| (s.strategy_key.clone(), s))
                .collect(),
            Err(e) => {
                summary
                    .errors
                    .push(format!("load simulations failed: {}", e));
                return;
            }
        };

        // One signal queue per strategy that is still allowed to enter.
        let mut queues: Vec<(StrategyDefinition, VecDeque<Signal>)> = Vec::new();
        for strategy in strategies {
            let Some(sim) = simulations.get(&strategy.key) else {
                continue;
            };
            if !sim.is_active() {
                continue;
            }
            match self
                .store
                .list_pending_signals(&strategy.key, self.config.signals_per_strategy)
                .await
            {
                Ok(signals) if !signals.is_empty() => {
                    queues.push((strategy, signals.into()));
                }
                Ok(_) => {}
                Err(e) => summary
                    .errors
                    .push(format!("signals for {} failed: {}", strategy.key, e)),
            }
        }
        if queues.is_empty() {
            return;
        }

        let symbols: Vec<String> = queues
            .iter()
            .flat_map(|(_, q)| q.iter().map(|s| s.symbol.clone()))
            .collect();
        cache
            .prefetch(
                self.provider.as_ref(),
                &symbols,
                self.config.quote_concurrency,
                self.config.quote_batch_delay,
                deadline,
            )
            .await;

        'round_robin: while queues.iter().any(|(_, q)| !q.is_empty()) {
            let mut exhausted: Vec<String> = Vec::new();
            for (strategy, queue) in queues.iter_mut() {
                if Instant::now() >= deadline {
                    summary.deadline_hit = true;
                    break 'round_robin;
                }
                let Some(signal) = queue.pop_front() else {
                    continue;
                };
                summary.signals_considered += 1;

                let Some(sim) = simulations.get_mut(&strategy.key) else {
                    continue;
                };

                match self
                    .try_entry(strategy, sim, &signal, cache, summary)
                    .await
                {
                    EntryOutcome::Opened => summary.trades_opened += 1,
                    EntryOutcome::Skipped => {}
                    EntryOutcome::CapitalExhausted => {
                        // Stop pulling signals for this strategy; the
                        // remaining ones stay pending for a future run.
                        summary.strategies_capital_exhausted += 1;
                        exhausted.push(strategy.key.clone());
                    }
                }
            }
            queues.retain(|(s, q)| !q.is_empty() && !exhausted.contains(&s.key));
        }
    }

    async fn try_entry(
        &self,
        strategy: &StrategyDefinition,
        sim: &mut Simulation,
        signal: &Signal,
        cache: &QuoteCache,
        summary: &mut BatchSummary,
    ) -> EntryOutcome {
        let sim_id = match sim.id {
            Some(id) => id,
            None => {
                summary
                    .errors
                    .push(format!("simulation for {} has no id", strategy.key));
                return EntryOutcome::Skipped;
            }
        };

        // Idempotency guard: a position may already exist from an earlier
        // run that processed this same signal.
        match self.store.find_position(sim_id, &signal.symbol).await {
            Ok(Some(_)) => {
                debug!(symbol = %signal.symbol, strategy = %strategy.key, "duplicate position, skipping");
                summary.signals_skipped_duplicate += 1;
                return EntryOutcome::Skipped;
            }
            Ok(None) => {}
            Err(e) => {
                summary
                    .errors
                    .push(format!("find position {} failed: {}", signal.symbol, e));
                return EntryOutcome::Skipped;
            }
        }

        let Some(price) = cache.get(&signal.symbol).map(|q| q.price) else {
            summary.signals_skipped_no_quote += 1;
            return EntryOutcome::Skipped;
        };

        let Some(size) = capital::size_position(sim.current_capital, strategy.position_size_pct, price)
        else {
            debug!(
                strategy = %strategy.key,
                capital = sim.current_capital,
                "insufficient capital, stopping entries for strategy"
            );
            return EntryOutcome::CapitalExhausted;
        };

        let (entry_atr, atr_stop_price, entry_macd_histogram) =
            lifecycle::entry_stop_state(&strategy.stop_loss, price, &signal.snapshot);

        let request = OpenRequest {
            simulation_id: sim_id,
            strategy_key: strategy.key.clone(),
            symbol: signal.symbol.clone(),
            shares: size.shares,
            price,
            time: Utc::now(),
            entry_atr,
            atr_stop_price,
            entry_macd_histogram,
        };

        match self.store.open_position(&request).await {
            Ok(_) => {
                // The signal is consumed only on a successful open; any
                // skip above leaves it pending for retry.
                if let Some(id) = signal.id {
                    if let Err(e) = self.store.mark_signal_processed(id).await {
                        summary
                            .errors
                            .push(format!("mark signal {} failed: {}", id, e));
                    }
                }
                sim.current_capital -= size.cost;
                info!(
                    symbol = %signal.symbol,
                    strategy = %strategy.key,
                    shares = size.shares,
                    price = price,
                    "position opened"
                );
                EntryOutcome::Opened
            }
            Err(e) => {
                warn!(symbol = %signal.symbol, error = %e, "open failed, signal left pending");
                summary
                    .errors
                    .push(format!("open {} failed: {}", signal.symbol, e));
                EntryOutcome::Skipped
            }
        }
    }

    async fn strategy_map(
        &self,
    ) -> Result<HashMap<String, StrategyDefinition>, crate::db::StoreError> {
        // Exits are serviced for inactive strategies too.
        Ok(self
            .store
            .list_strategies()
            .await?
            .into_iter()
            .map(|s| (s.key.clone(), s))
            .collect())
    }

    async fn simulation_map(&self) -> Result<HashMap<i64, Simulation>, crate::db::StoreError> {
        Ok(self
            .store
            .list_simulations()
            .await?
            .into_iter()
            .filter_map(|s| s.id.map(|id| (id, s)))
            .collect())
    }

    async fn fresh_snapshot(&self, symbol: &str) -> Option<IndicatorSnapshot> {
        let max_age = ChronoDuration::hours(self.config.snapshot_max_age_hours);
        self.store
            .get_snapshot(symbol)
            .await
            .ok()
            .flatten()
            .filter(|s| s.is_fresh(Utc::now(), max_age))
    }
}

enum EntryOutcome {
    Opened,
    Skipped,
    CapitalExhausted,
}
