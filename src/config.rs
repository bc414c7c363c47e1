//! Environment-based configuration readers.

use std::env;

/// Deployment environment name ("production", "sandbox", ...)
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Postgres connection string
pub fn get_database_url() -> String {
    env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost:5432/swingforge".to_string())
}

pub fn get_finnhub_api_key() -> String {
    env::var("FINNHUB_API_KEY").unwrap_or_default()
}

pub fn get_finnhub_base_url() -> String {
    env::var("FINNHUB_BASE_URL").unwrap_or_else(|_| "https://finnhub.io/api/v1".to_string())
}

/// Shared secret guarding the batch/scan trigger endpoints.
/// `None` means the triggers refuse to run (fail safe).
pub fn get_trigger_secret() -> Option<String> {
    env::var("TRIGGER_SECRET").ok().filter(|s| !s.is_empty())
}

pub fn get_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

/// Comma-separated symbol watchlist for the snapshot refresh pass.
pub fn get_watchlist() -> Vec<String> {
    env::var("WATCHLIST")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn get_batch_budget_ms() -> u64 {
    parse_env("BATCH_BUDGET_MS", 55_000)
}

pub fn get_quote_concurrency() -> usize {
    parse_env("QUOTE_CONCURRENCY", 5)
}

pub fn get_quote_batch_delay_ms() -> u64 {
    parse_env("QUOTE_BATCH_DELAY_MS", 250)
}

pub fn get_signals_per_strategy() -> usize {
    parse_env("SIGNALS_PER_STRATEGY", 5)
}

pub fn get_signal_retention_days() -> i64 {
    parse_env("SIGNAL_RETENTION_DAYS", 30)
}

pub fn get_snapshot_max_age_hours() -> i64 {
    parse_env("SNAPSHOT_MAX_AGE_HOURS", 72)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
