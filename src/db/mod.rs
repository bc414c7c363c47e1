//! Persistent store interface.
//!
//! The engine runs against any `SimStore`; `PgStore` backs production and
//! `MemoryStore` backs tests with the same atomicity semantics.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::account::Simulation;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::position::{ExitFill, Position, Trade};
use crate::models::signal::Signal;
use crate::models::strategy::StrategyDefinition;

pub use memory::MemoryStore;
pub use pg::PgStore;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Everything needed to open a position atomically: the open-leg trade,
/// the position row with its stop working state, and the capital debit.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub simulation_id: i64,
    pub strategy_key: String,
    pub symbol: String,
    pub shares: i64,
    pub price: f64,
    pub time: DateTime<Utc>,
    pub entry_atr: Option<f64>,
    pub atr_stop_price: Option<f64>,
    pub entry_macd_histogram: Option<f64>,
}

#[async_trait]
pub trait SimStore: Send + Sync {
    /// Insert catalog strategies and their simulations where missing.
    async fn seed_strategies(&self, defs: &[StrategyDefinition]) -> StoreResult<()>;
    async fn list_strategies(&self) -> StoreResult<Vec<StrategyDefinition>>;
    async fn list_active_strategies(&self) -> StoreResult<Vec<StrategyDefinition>>;

    async fn list_simulations(&self) -> StoreResult<Vec<Simulation>>;

    /// Insert or refresh the (symbol, strategy_key) signal: price,
    /// snapshot and scan time are replaced and `processed` resets.
    async fn upsert_signal(&self, signal: &Signal) -> StoreResult<()>;
    /// Unprocessed signals for one strategy, oldest first.
    async fn list_pending_signals(
        &self,
        strategy_key: &str,
        limit: usize,
    ) -> StoreResult<Vec<Signal>>;
    async fn mark_signal_processed(&self, signal_id: i64) -> StoreResult<()>;
    /// Delete unprocessed signals scanned before the cutoff. Returns the
    /// number removed.
    async fn age_out_signals(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;

    async fn find_position(
        &self,
        simulation_id: i64,
        symbol: &str,
    ) -> StoreResult<Option<Position>>;
    async fn list_open_positions(&self) -> StoreResult<Vec<Position>>;
    /// Atomic open: create the open-leg trade and position and debit the
    /// simulation's capital as one unit. Fails when a position already
    /// exists for (simulation, symbol).
    async fn open_position(&self, request: &OpenRequest) -> StoreResult<Position>;
    async fn update_position_mark(&self, position: &Position) -> StoreResult<()>;
    /// Atomic close: stamp the trade's exit fields, credit capital,
    /// update aggregates and delete the position as one unit.
    async fn close_position(&self, position: &Position, fill: &ExitFill) -> StoreResult<Trade>;

    async fn list_trades(&self, strategy_key: Option<&str>) -> StoreResult<Vec<Trade>>;

    async fn upsert_snapshot(&self, snapshot: &IndicatorSnapshot) -> StoreResult<()>;
    async fn get_snapshot(&self, symbol: &str) -> StoreResult<Option<IndicatorSnapshot>>;
    async fn list_snapshots(&self) -> StoreResult<Vec<IndicatorSnapshot>>;
}
