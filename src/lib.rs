//! Swingforge — rule-based swing-trade simulation engine.
//!
//! Computes technical indicators over daily candles, evaluates declarative
//! entry/exit conditions, manages simulated positions and per-strategy
//! capital ledgers, and drives everything from a time-boxed batch run
//! triggered over HTTP.

pub mod conditions;
pub mod config;
pub mod core;
pub mod db;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod trading;
