//! Data models shared across the engine.

pub mod account;
pub mod catalog;
pub mod condition;
pub mod indicators;
pub mod market;
pub mod position;
pub mod signal;
pub mod strategy;
pub mod summary;
