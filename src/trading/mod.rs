//! Position lifecycle, capital ledger, and the batch scheduler.

pub mod capital;
pub mod lifecycle;
pub mod quote_cache;
pub mod scheduler;
