//! Structured run summaries returned by the trigger endpoints.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ERROR_CAP: usize = 25;

/// Bounded error list shared by batch and scan summaries. Errors past the
/// cap are counted, not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorList {
    pub errors: Vec<String>,
    pub truncated: u32,
    #[serde(skip, default = "default_cap")]
    cap: usize,
}

fn default_cap() -> usize {
    DEFAULT_ERROR_CAP
}

impl Default for ErrorList {
    fn default() -> Self {
        Self::with_cap(DEFAULT_ERROR_CAP)
    }
}

impl ErrorList {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            errors: Vec::new(),
            truncated: 0,
            cap,
        }
    }

    pub fn push(&mut self, error: impl Into<String>) {
        if self.errors.len() < self.cap {
            self.errors.push(error.into());
        } else {
            self.truncated += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.errors.len() as u32 + self.truncated
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchSummary {
    pub positions_checked: u32,
    pub positions_closed: u32,
    pub positions_skipped_no_quote: u32,
    pub trades_opened: u32,
    pub signals_considered: u32,
    pub signals_skipped_no_quote: u32,
    pub signals_skipped_duplicate: u32,
    pub strategies_capital_exhausted: u32,
    pub signals_aged_out: u64,
    pub deadline_hit: bool,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub errors: ErrorList,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScanSummary {
    pub symbols_refreshed: u32,
    pub symbols_unavailable: u32,
    pub snapshots_scanned: u32,
    pub snapshots_stale_skipped: u32,
    pub signals_upserted: u32,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub errors: ErrorList,
}
