//! Signal scanning.

pub mod scanner;

pub use scanner::{ScanConfig, SignalScanner};
