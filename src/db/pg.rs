//! Postgres-backed store.
//!
//! Nested payloads (strategy config, indicator snapshots) are stored as
//! JSON text; the open/close units run inside real transactions so a
//! partial application (capital credited but position kept) cannot be
//! observed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls, Row, Transaction};

use crate::config;
use crate::models::account::{Simulation, SimulationStatus};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::market::MarketSession;
use crate::models::position::{ExitFill, ExitReason, Position, Trade};
use crate::models::signal::Signal;
use crate::models::strategy::StrategyDefinition;
use crate::trading::capital;

use super::{OpenRequest, SimStore, StoreError, StoreResult};

pub struct PgStore {
    client: Mutex<Client>,
}

fn store_err(context: &str, e: impl std::fmt::Display) -> StoreError {
    Box::new(std::io::Error::other(format!("{}: {}", context, e)))
}

impl PgStore {
    pub async fn new() -> StoreResult<Self> {
        Self::connect(&config::get_database_url()).await
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("Failed to connect to Postgres: {}", e),
                )) as StoreError
            })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "Postgres connection error");
            }
        });

        let store = Self {
            client: Mutex::new(client),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        let client = self.client.lock().await;
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS strategies (
                    key TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    active BOOLEAN NOT NULL DEFAULT TRUE,
                    config_json TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS simulations (
                    id BIGSERIAL PRIMARY KEY,
                    strategy_key TEXT NOT NULL UNIQUE REFERENCES strategies(key),
                    initial_capital DOUBLE PRECISION NOT NULL,
                    current_capital DOUBLE PRECISION NOT NULL,
                    total_pl DOUBLE PRECISION NOT NULL DEFAULT 0,
                    trades_completed INT NOT NULL DEFAULT 0,
                    wins INT NOT NULL DEFAULT 0,
                    losses INT NOT NULL DEFAULT 0,
                    gross_profit DOUBLE PRECISION NOT NULL DEFAULT 0,
                    gross_loss DOUBLE PRECISION NOT NULL DEFAULT 0,
                    largest_win DOUBLE PRECISION NOT NULL DEFAULT 0,
                    largest_loss DOUBLE PRECISION NOT NULL DEFAULT 0,
                    peak_capital DOUBLE PRECISION NOT NULL,
                    max_drawdown DOUBLE PRECISION NOT NULL DEFAULT 0,
                    trade_limit INT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'ACTIVE'
                );
                CREATE TABLE IF NOT EXISTS signals (
                    id BIGSERIAL PRIMARY KEY,
                    symbol TEXT NOT NULL,
                    strategy_key TEXT NOT NULL,
                    price DOUBLE PRECISION NOT NULL,
                    snapshot_json TEXT NOT NULL,
                    processed BOOLEAN NOT NULL DEFAULT FALSE,
                    scanned_at TIMESTAMPTZ NOT NULL,
                    UNIQUE (symbol, strategy_key)
                );
                CREATE TABLE IF NOT EXISTS trades (
                    id BIGSERIAL PRIMARY KEY,
                    simulation_id BIGINT NOT NULL,
                    symbol TEXT NOT NULL,
                    strategy_key TEXT NOT NULL,
                    shares BIGINT NOT NULL,
                    entry_price DOUBLE PRECISION NOT NULL,
                    entry_time TIMESTAMPTZ NOT NULL,
                    exit_price DOUBLE PRECISION,
                    exit_time TIMESTAMPTZ,
                    exit_reason TEXT,
                    realized_pl DOUBLE PRECISION,
                    realized_pl_pct DOUBLE PRECISION,
                    hold_days BIGINT,
                    exit_session TEXT
                );
                CREATE TABLE IF NOT EXISTS positions (
                    id BIGSERIAL PRIMARY KEY,
                    simulation_id BIGINT NOT NULL,
                    trade_id BIGINT NOT NULL,
                    symbol TEXT NOT NULL,
                    shares BIGINT NOT NULL,
                    entry_price DOUBLE PRECISION NOT NULL,
                    entry_time TIMESTAMPTZ NOT NULL,
                    current_price DOUBLE PRECISION NOT NULL,
                    current_value DOUBLE PRECISION NOT NULL,
                    unrealized_pl DOUBLE PRECISION NOT NULL,
                    unrealized_pl_pct DOUBLE PRECISION NOT NULL,
                    high_water_mark DOUBLE PRECISION NOT NULL,
                    entry_atr DOUBLE PRECISION,
                    atr_stop_price DOUBLE PRECISION,
                    entry_macd_histogram DOUBLE PRECISION,
                    UNIQUE (simulation_id, symbol)
                );
                CREATE TABLE IF NOT EXISTS indicator_snapshots (
                    symbol TEXT PRIMARY KEY,
                    payload_json TEXT NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL
                );",
            )
            .await
            .map_err(|e| store_err("Failed to initialize schema", e))?;
        Ok(())
    }
}

fn simulation_from_row(row: &Row) -> StoreResult<Simulation> {
    let status_text: String = row.get("status");
    let status = SimulationStatus::parse(&status_text)
        .ok_or_else(|| store_err("Unknown simulation status", &status_text))?;
    Ok(Simulation {
        id: Some(row.get("id")),
        strategy_key: row.get("strategy_key"),
        initial_capital: row.get("initial_capital"),
        current_capital: row.get("current_capital"),
        total_pl: row.get("total_pl"),
        trades_completed: row.get::<_, i32>("trades_completed") as u32,
        wins: row.get::<_, i32>("wins") as u32,
        losses: row.get::<_, i32>("losses") as u32,
        gross_profit: row.get("gross_profit"),
        gross_loss: row.get("gross_loss"),
        largest_win: row.get("largest_win"),
        largest_loss: row.get("largest_loss"),
        peak_capital: row.get("peak_capital"),
        max_drawdown: row.get("max_drawdown"),
        trade_limit: row.get::<_, i32>("trade_limit") as u32,
        status,
    })
}

fn position_from_row(row: &Row) -> Position {
    Position {
        id: Some(row.get("id")),
        simulation_id: row.get("simulation_id"),
        trade_id: row.get("trade_id"),
        symbol: row.get("symbol"),
        shares: row.get("shares"),
        entry_price: row.get("entry_price"),
        entry_time: row.get("entry_time"),
        current_price: row.get("current_price"),
        current_value: row.get("current_value"),
        unrealized_pl: row.get("unrealized_pl"),
        unrealized_pl_pct: row.get("unrealized_pl_pct"),
        high_water_mark: row.get("high_water_mark"),
        entry_atr: row.get("entry_atr"),
        atr_stop_price: row.get("atr_stop_price"),
        entry_macd_histogram: row.get("entry_macd_histogram"),
    }
}

fn trade_from_row(row: &Row) -> Trade {
    let exit_reason: Option<String> = row.get("exit_reason");
    let exit_session: Option<String> = row.get("exit_session");
    Trade {
        id: Some(row.get("id")),
        simulation_id: row.get("simulation_id"),
        symbol: row.get("symbol"),
        strategy_key: row.get("strategy_key"),
        shares: row.get("shares"),
        entry_price: row.get("entry_price"),
        entry_time: row.get("entry_time"),
        exit_price: row.get("exit_price"),
        exit_time: row.get("exit_time"),
        exit_reason: exit_reason.as_deref().and_then(ExitReason::parse),
        realized_pl: row.get("realized_pl"),
        realized_pl_pct: row.get("realized_pl_pct"),
        hold_days: row.get("hold_days"),
        exit_session: exit_session.as_deref().and_then(MarketSession::parse),
    }
}

fn signal_from_row(row: &Row) -> StoreResult<Signal> {
    let snapshot_json: String = row.get("snapshot_json");
    let snapshot: IndicatorSnapshot = serde_json::from_str(&snapshot_json)
        .map_err(|e| store_err("Failed to decode signal snapshot", e))?;
    Ok(Signal {
        id: Some(row.get("id")),
        symbol: row.get("symbol"),
        strategy_key: row.get("strategy_key"),
        price: row.get("price"),
        snapshot,
        processed: row.get("processed"),
        scanned_at: row.get("scanned_at"),
    })
}

fn strategy_from_row(row: &Row) -> StoreResult<StrategyDefinition> {
    let config_json: String = row.get("config_json");
    let mut def: StrategyDefinition = serde_json::from_str(&config_json)
        .map_err(|e| store_err("Failed to decode strategy config", e))?;
    def.active = row.get("active");
    Ok(def)
}

async fn update_simulation(tx: &Transaction<'_>, sim: &Simulation) -> StoreResult<()> {
    tx.execute(
        "UPDATE simulations SET
            current_capital = $2, total_pl = $3, trades_completed = $4,
            wins = $5, losses = $6, gross_profit = $7, gross_loss = $8,
            largest_win = $9, largest_loss = $10, peak_capital = $11,
            max_drawdown = $12, status = $13
         WHERE id = $1",
        &[
            &sim.id,
            &sim.current_capital,
            &sim.total_pl,
            &(sim.trades_completed as i32),
            &(sim.wins as i32),
            &(sim.losses as i32),
            &sim.gross_profit,
            &sim.gross_loss,
            &sim.largest_win,
            &sim.largest_loss,
            &sim.peak_capital,
            &sim.max_drawdown,
            &sim.status.as_str(),
        ],
    )
    .await
    .map_err(|e| store_err("Failed to update simulation", e))?;
    Ok(())
}

#[async_trait]
impl SimStore for PgStore {
    async fn seed_strategies(&self, defs: &[StrategyDefinition]) -> StoreResult<()> {
        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| store_err("Failed to begin seed transaction", e))?;
        for def in defs {
            let config_json = serde_json::to_string(def)
                .map_err(|e| store_err("Failed to encode strategy config", e))?;
            let inserted = tx
                .execute(
                    "INSERT INTO strategies (key, name, active, config_json)
                     VALUES ($1, $2, $3, $4)
                     ON CONFLICT (key) DO NOTHING",
                    &[&def.key, &def.name, &def.active, &config_json],
                )
                .await
                .map_err(|e| store_err("Failed to seed strategy", e))?;
            if inserted > 0 {
                tx.execute(
                    "INSERT INTO simulations
                        (strategy_key, initial_capital, current_capital, peak_capital, trade_limit)
                     VALUES ($1, $2, $2, $2, $3)
                     ON CONFLICT (strategy_key) DO NOTHING",
                    &[&def.key, &def.initial_capital, &(def.trade_limit as i32)],
                )
                .await
                .map_err(|e| store_err("Failed to seed simulation", e))?;
            }
        }
        tx.commit()
            .await
            .map_err(|e| store_err("Failed to commit seed transaction", e))?;
        Ok(())
    }

    async fn list_strategies(&self) -> StoreResult<Vec<StrategyDefinition>> {
        let client = self.client.lock().await;
        let rows = client
            .query("SELECT active, config_json FROM strategies", &[])
            .await
            .map_err(|e| store_err("Failed to list strategies", e))?;
        rows.iter().map(strategy_from_row).collect()
    }

    async fn list_active_strategies(&self) -> StoreResult<Vec<StrategyDefinition>> {
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT active, config_json FROM strategies WHERE active",
                &[],
            )
            .await
            .map_err(|e| store_err("Failed to list active strategies", e))?;
        rows.iter().map(strategy_from_row).collect()
    }

    async fn list_simulations(&self) -> StoreResult<Vec<Simulation>> {
        let client = self.client.lock().await;
        let rows = client
            .query("SELECT * FROM simulations ORDER BY id", &[])
            .await
            .map_err(|e| store_err("Failed to list simulations", e))?;
        rows.iter().map(simulation_from_row).collect()
    }

    async fn upsert_signal(&self, signal: &Signal) -> StoreResult<()> {
        let snapshot_json = serde_json::to_string(&signal.snapshot)
            .map_err(|e| store_err("Failed to encode snapshot", e))?;
        let client = self.client.lock().await;
        client
            .execute(
                "INSERT INTO signals (symbol, strategy_key, price, snapshot_json, processed, scanned_at)
                 VALUES ($1, $2, $3, $4, FALSE, $5)
                 ON CONFLICT (symbol, strategy_key) DO UPDATE SET
                    price = EXCLUDED.price,
                    snapshot_json = EXCLUDED.snapshot_json,
                    processed = FALSE,
                    scanned_at = EXCLUDED.scanned_at",
                &[
                    &signal.symbol,
                    &signal.strategy_key,
                    &signal.price,
                    &snapshot_json,
                    &signal.scanned_at,
                ],
            )
            .await
            .map_err(|e| store_err("Failed to upsert signal", e))?;
        Ok(())
    }

    async fn list_pending_signals(
        &self,
        strategy_key: &str,
        limit: usize,
    ) -> StoreResult<Vec<Signal>> {
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT * FROM signals
                 WHERE strategy_key = $1 AND NOT processed
                 ORDER BY scanned_at ASC
                 LIMIT $2",
                &[&strategy_key, &(limit as i64)],
            )
            .await
            .map_err(|e| store_err("Failed to list pending signals", e))?;
        rows.iter().map(signal_from_row).collect()
    }

    async fn mark_signal_processed(&self, signal_id: i64) -> StoreResult<()> {
        let client = self.client.lock().await;
        client
            .execute("UPDATE signals SET processed = TRUE WHERE id = $1", &[
                &signal_id,
            ])
            .await
            .map_err(|e| store_err("Failed to mark signal processed", e))?;
        Ok(())
    }

    async fn age_out_signals(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let client = self.client.lock().await;
        let removed = client
            .execute(
                "DELETE FROM signals WHERE NOT processed AND scanned_at < $1",
                &[&cutoff],
            )
            .await
            .map_err(|e| store_err("Failed to age out signals", e))?;
        Ok(removed)
    }

    async fn find_position(
        &self,
        simulation_id: i64,
        symbol: &str,
    ) -> StoreResult<Option<Position>> {
        let client = self.client.lock().await;
        let row = client
            .query_opt(
                "SELECT * FROM positions WHERE simulation_id = $1 AND symbol = $2",
                &[&simulation_id, &symbol],
            )
            .await
            .map_err(|e| store_err("Failed to find position", e))?;
        Ok(row.as_ref().map(position_from_row))
    }

    async fn list_open_positions(&self) -> StoreResult<Vec<Position>> {
        let client = self.client.lock().await;
        let rows = client
            .query("SELECT * FROM positions ORDER BY id", &[])
            .await
            .map_err(|e| store_err("Failed to list positions", e))?;
        Ok(rows.iter().map(position_from_row).collect())
    }

    async fn open_position(&self, request: &OpenRequest) -> StoreResult<Position> {
        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| store_err("Failed to begin open transaction", e))?;

        let cost = request.shares as f64 * request.price;
        tx.execute(
            "UPDATE simulations SET current_capital = current_capital - $2 WHERE id = $1",
            &[&request.simulation_id, &cost],
        )
        .await
        .map_err(|e| store_err("Failed to debit capital", e))?;

        let trade_row = tx
            .query_one(
                "INSERT INTO trades
                    (simulation_id, symbol, strategy_key, shares, entry_price, entry_time)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING id",
                &[
                    &request.simulation_id,
                    &request.symbol,
                    &request.strategy_key,
                    &request.shares,
                    &request.price,
                    &request.time,
                ],
            )
            .await
            .map_err(|e| store_err("Failed to create trade", e))?;
        let trade_id: i64 = trade_row.get(0);

        // The UNIQUE (simulation_id, symbol) constraint rejects the
        // duplicate here and rolls the whole unit back.
        let position_row = tx
            .query_one(
                "INSERT INTO positions
                    (simulation_id, trade_id, symbol, shares, entry_price, entry_time,
                     current_price, current_value, unrealized_pl, unrealized_pl_pct,
                     high_water_mark, entry_atr, atr_stop_price, entry_macd_histogram)
                 VALUES ($1, $2, $3, $4, $5, $6, $5, $7, 0, 0, $5, $8, $9, $10)
                 RETURNING id",
                &[
                    &request.simulation_id,
                    &trade_id,
                    &request.symbol,
                    &request.shares,
                    &request.price,
                    &request.time,
                    &cost,
                    &request.entry_atr,
                    &request.atr_stop_price,
                    &request.entry_macd_histogram,
                ],
            )
            .await
            .map_err(|e| store_err("Failed to create position", e))?;
        let position_id: i64 = position_row.get(0);

        tx.commit()
            .await
            .map_err(|e| store_err("Failed to commit open transaction", e))?;

        Ok(Position {
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
        })
    }

    async fn update_position_mark(&self, position: &Position) -> StoreResult<()> {
        let client = self.client.lock().await;
        client
            .execute(
                "UPDATE positions SET
                    current_price = $2, current_value = $3,
                    unrealized_pl = $4, unrealized_pl_pct = $5, high_water_mark = $6
                 WHERE id = $1",
                &[
                    &position.id,
                    &position.current_price,
                    &position.current_value,
                    &position.unrealized_pl,
                    &position.unrealized_pl_pct,
                    &position.high_water_mark,
                ],
            )
            .await
            .map_err(|e| store_err("Failed to update position mark", e))?;
        Ok(())
    }

    async fn close_position(&self, position: &Position, fill: &ExitFill) -> StoreResult<Trade> {
        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| store_err("Failed to begin close transaction", e))?;

        let sim_row = tx
            .query_one(
                "SELECT * FROM simulations WHERE id = $1 FOR UPDATE",
                &[&position.simulation_id],
            )
            .await
            .map_err(|e| store_err("Failed to lock simulation", e))?;
        let mut sim = simulation_from_row(&sim_row)?;
        capital::apply_exit(&mut sim, position.shares, position.entry_price, fill.price);
        update_simulation(&tx, &sim).await?;

        let realized_pl = (fill.price - position.entry_price) * position.shares as f64;
        let realized_pl_pct = Position::unrealized_pct(position.entry_price, fill.price);
        let hold_days = (fill.time - position.entry_time).num_days();
        let session = MarketSession::at(fill.time);

        let trade_row = tx
            .query_one(
                "UPDATE trades SET
                    exit_price = $2, exit_time = $3, exit_reason = $4,
                    realized_pl = $5, realized_pl_pct = $6, hold_days = $7, exit_session = $8
                 WHERE id = $1
                 RETURNING *",
                &[
                    &position.trade_id,
                    &fill.price,
                    &fill.time,
                    &fill.reason.as_str(),
                    &realized_pl,
                    &realized_pl_pct,
                    &hold_days,
                    &session.as_str(),
                ],
            )
            .await
            .map_err(|e| store_err("Failed to stamp trade exit", e))?;

        tx.execute("DELETE FROM positions WHERE id = $1", &[&position.id])
            .await
            .map_err(|e| store_err("Failed to delete position", e))?;

        tx.commit()
            .await
            .map_err(|e| store_err("Failed to commit close transaction", e))?;

        Ok(trade_from_row(&trade_row))
    }

    async fn list_trades(&self, strategy_key: Option<&str>) -> StoreResult<Vec<Trade>> {
        let client = self.client.lock().await;
        let rows = match strategy_key {
            Some(key) => client
                .query(
                    "SELECT * FROM trades WHERE strategy_key = $1 ORDER BY id",
                    &[&key],
                )
                .await
                .map_err(|e| store_err("Failed to list trades", e))?,
            None => client
                .query("SELECT * FROM trades ORDER BY id", &[])
                .await
                .map_err(|e| store_err("Failed to list trades", e))?,
        };
        Ok(rows.iter().map(trade_from_row).collect())
    }

    async fn upsert_snapshot(&self, snapshot: &IndicatorSnapshot) -> StoreResult<()> {
        let payload_json = serde_json::to_string(snapshot)
            .map_err(|e| store_err("Failed to encode snapshot", e))?;
        let client = self.client.lock().await;
        client
            .execute(
                "INSERT INTO indicator_snapshots (symbol, payload_json, updated_at)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (symbol) DO UPDATE SET
                    payload_json = EXCLUDED.payload_json,
                    updated_at = EXCLUDED.updated_at",
                &[&snapshot.symbol, &payload_json, &snapshot.computed_at],
            )
            .await
            .map_err(|e| store_err("Failed to upsert snapshot", e))?;
        Ok(())
    }

    async fn get_snapshot(&self, symbol: &str) -> StoreResult<Option<IndicatorSnapshot>> {
        let client = self.client.lock().await;
        let row = client
            .query_opt(
                "SELECT payload_json FROM indicator_snapshots WHERE symbol = $1",
                &[&symbol],
            )
            .await
            .map_err(|e| store_err("Failed to read snapshot", e))?;
        match row {
            Some(row) => {
                let payload: String = row.get(0);
                let snapshot = serde_json::from_str(&payload)
                    .map_err(|e| store_err("Failed to decode snapshot", e))?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    async fn list_snapshots(&self) -> StoreResult<Vec<IndicatorSnapshot>> {
        let client = self.client.lock().await;
        let rows = client
            .query("SELECT payload_json FROM indicator_snapshots", &[])
            .await
            .map_err(|e| store_err("Failed to list snapshots", e))?;
        rows.iter()
            .map(|row| {
                let payload: String = row.get(0);
                serde_json::from_str(&payload)
                    .map_err(|e| store_err("Failed to decode snapshot", e))
            })
            .collect()
    }
}
