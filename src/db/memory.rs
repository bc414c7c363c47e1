//! In-memory store used by tests and local development.
//!
//! One mutex guards all tables, which makes the open/close units atomic
//! by construction — the same semantics `PgStore` gets from transactions.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::models::account::Simulation;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::market::MarketSession;
use crate::models::position::{ExitFill, Position, Trade};
use crate::models::signal::Signal;
use crate::models::strategy::StrategyDefinition;
use crate::trading::capital;

use super::{OpenRequest, SimStore, StoreResult};

#[derive(Default)]
struct Inner {
    strategies: Vec<StrategyDefinition>,
    simulations: Vec<Simulation>,
    signals: Vec<Signal>,
    positions: Vec<Position>,
    trades: Vec<Trade>,
    snapshots: HashMap<String, IndicatorSnapshot>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: read one simulation by strategy key.
    pub async fn simulation(&self, strategy_key: &str) -> Option<Simulation> {
        let inner = self.inner.lock().await;
        inner
            .simulations
            .iter()
            .find(|s| s.strategy_key == strategy_key)
            .cloned()
    }

    /// Test hook: replace one simulation's ledger fields.
    pub async fn put_simulation(&self, sim: Simulation) {
        let mut inner = self.inner.lock().await;
        match inner
            .simulations
            .iter()
            .position(|s| s.strategy_key == sim.strategy_key)
        {
            Some(idx) => {
                let existing = &mut inner.simulations[idx];
                let id = existing.id;
                *existing = sim;
                existing.id = id;
            }
            None => {
                let id = inner.next_id();
                let mut sim = sim;
                sim.id = Some(id);
                inner.simulations.push(sim);
            }
        }
    }

    /// Test hook: all signals, processed or not.
    pub async fn all_signals(&self) -> Vec<Signal> {
        self.inner.lock().await.signals.clone()
    }
}

#[async_trait]
impl SimStore for MemoryStore {
    async fn seed_strategies(&self, defs: &[StrategyDefinition]) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        for def in defs {
            if inner.strategies.iter().any(|s| s.key == def.key) {
                continue;
            }
            inner.strategies.push(def.clone());
            let id = inner.next_id();
            let mut sim = Simulation::new(&def.key, def.initial_capital, def.trade_limit);
            sim.id = Some(id);
            inner.simulations.push(sim);
        }
        Ok(())
    }

    async fn list_strategies(&self) -> StoreResult<Vec<StrategyDefinition>> {
        Ok(self.inner.lock().await.strategies.clone())
    }

    async fn list_active_strategies(&self) -> StoreResult<Vec<StrategyDefinition>> {
        Ok(self
            .inner
            .lock()
            .await
            .strategies
            .iter()
            .filter(|s| s.active)
            .cloned()
            .collect())
    }

    async fn list_simulations(&self) -> StoreResult<Vec<Simulation>> {
        Ok(self.inner.lock().await.simulations.clone())
    }

    async fn upsert_signal(&self, signal: &Signal) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        match inner
            .signals
            .iter()
            .position(|s| s.symbol == signal.symbol && s.strategy_key == signal.strategy_key)
        {
            Some(idx) => {
                let existing = &mut inner.signals[idx];
                existing.price = signal.price;
                existing.snapshot = signal.snapshot.clone();
                existing.scanned_at = signal.scanned_at;
                existing.processed = false;
            }
            None => {
                let id = inner.next_id();
                let mut signal = signal.clone();
                signal.id = Some(id);
                inner.signals.push(signal);
            }
        }
        Ok(())
    }

    async fn list_pending_signals(
        &self,
        strategy_key: &str,
        limit: usize,
    ) -> StoreResult<Vec<Signal>> {
        let inner = self.inner.lock().await;
        let mut pending: Vec<Signal> = inner
            .signals
            .iter()
            .filter(|s| s.strategy_key == strategy_key && !s.processed)
            .cloned()
            .collect();
        pending.sort_by_key(|s| s.scanned_at);
        pending.truncate(limit);
        Ok(pending)
    }

    async fn mark_signal_processed(&self, signal_id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        match inner.signals.iter_mut().find(|s| s.id == Some(signal_id)) {
            Some(signal) => {
                signal.processed = true;
                Ok(())
            }
            None => Err(format!("signal {} not found", signal_id).into()),
        }
    }

    async fn age_out_signals(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let mut inner = self.inner.lock().await;
        let before = inner.signals.len();
        inner
            .signals
            .retain(|s| s.processed || s.scanned_at >= cutoff);
        Ok((before - inner.signals.len()) as u64)
    }

    async fn find_position(
        &self,
        simulation_id: i64,
        symbol: &str,
    ) -> StoreResult<Option<Position>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .positions
            .iter()
            .find(|p| p.simulation_id == simulation_id && p.symbol == symbol)
            .cloned())
    }

    async fn list_open_positions(&self) -> StoreResult<Vec<Position>> {
        Ok(self.inner.lock().await.positions.clone())
    }

    async fn open_position(&self, request: &OpenRequest) -> StoreResult<Position> {
        let mut inner = self.inner.lock().await;

        // Uniqueness backstop; the scheduler also checks before calling.
        if inner
            .positions
            .iter()
            .any(|p| p.simulation_id == request.simulation_id && p.symbol == request.symbol)
        {
            return Err(format!(
                "position already open for simulation {} {}",
                request.simulation_id, request.symbol
            )
            .into());
        }

        let cost = request.shares as f64 * request.price;
        let sim = inner
            .simulations
            .iter_mut()
            .find(|s| s.id == Some(request.simulation_id))
            .ok_or_else(|| format!("simulation {} not found", request.simulation_id))?;
        capital::apply_entry(sim, cost);

        let trade_id = inner.next_id();
        inner.trades.push(Trade {
            id: Some(trade_id),
            simulation_id: request.simulation_id,
            symbol: request.symbol.clone(),
            strategy_key: request.strategy_key.clone(),
            shares: request.shares,
            entry_price: request.price,
            entry_time: request.time,
            exit_price: None,
            exit_time: None,
            exit_reason: None,
            realized_pl: None,
            realized_pl_pct: None,
            hold_days: None,
            exit_session: None,
        });

        let position_id = inner.next_id();
        let position = Position {
            id: Some(position_id),
            simulation_id: request.simulation_id,
            trade_id,
            symbol: request.symbol.clone(),
            shares: request.shares,
            entry_price: request.price,
            entry_time: request.time,
            current_price: request.price,
            current_value: cost,
            unrealized_pl: 0.0,
            unrealized_pl_pct: 0.0,
            high_water_mark: request.price,
            entry_atr: request.entry_atr,
            atr_stop_price: request.atr_stop_price,
            entry_macd_histogram: request.entry_macd_histogram,
        };
        inner.positions.push(position.clone());
        Ok(position)
    }

    async fn update_position_mark(&self, position: &Position) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        match inner.positions.iter_mut().find(|p| p.id == position.id) {
            Some(existing) => {
                existing.current_price = position.current_price;
                existing.current_value = position.current_value;
                existing.unrealized_pl = position.unrealized_pl;
                existing.unrealized_pl_pct = position.unrealized_pl_pct;
                existing.high_water_mark = position.high_water_mark;
                Ok(())
            }
            None => Err(format!("position {:?} not found", position.id).into()),
        }
    }

    async fn close_position(&self, position: &Position, fill: &ExitFill) -> StoreResult<Trade> {
        let mut inner = self.inner.lock().await;

        let sim = inner
            .simulations
            .iter_mut()
            .find(|s| s.id == Some(position.simulation_id))
            .ok_or_else(|| format!("simulation {} not found", position.simulation_id))?;
        capital::apply_exit(sim, position.shares, position.entry_price, fill.price);

        let realized_pl = (fill.price - position.entry_price) * position.shares as f64;
        let realized_pl_pct = Position::unrealized_pct(position.entry_price, fill.price);
        let hold_days = (fill.time - position.entry_time).num_days();

        let trade = inner
            .trades
            .iter_mut()
            .find(|t| t.id == Some(position.trade_id))
            .ok_or_else(|| format!("trade {} not found", position.trade_id))?;
        trade.exit_price = Some(fill.price);
        trade.exit_time = Some(fill.time);
        trade.exit_reason = Some(fill.reason);
        trade.realized_pl = Some(realized_pl);
        trade.realized_pl_pct = Some(realized_pl_pct);
        trade.hold_days = Some(hold_days);
        trade.exit_session = Some(MarketSession::at(fill.time));
        let closed = trade.clone();

        inner.positions.retain(|p| p.id != position.id);
        Ok(closed)
    }

    async fn list_trades(&self, strategy_key: Option<&str>) -> StoreResult<Vec<Trade>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .trades
            .iter()
            .filter(|t| strategy_key.map_or(true, |k| t.strategy_key == k))
            .cloned()
            .collect())
    }

    async fn upsert_snapshot(&self, snapshot: &IndicatorSnapshot) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .snapshots
            .insert(snapshot.symbol.clone(), snapshot.clone());
        Ok(())
    }

    async fn get_snapshot(&self, symbol: &str) -> StoreResult<Option<IndicatorSnapshot>> {
        Ok(self.inner.lock().await.snapshots.get(symbol).cloned())
    }

    async fn list_snapshots(&self) -> StoreResult<Vec<IndicatorSnapshot>> {
        Ok(self.inner.lock().await.snapshots.values().cloned().collect())
    }
}
