//! Pure indicator computation over candle series.
//!
//! Every function returns `None` on insufficient history; no indicator
//! ever panics or errors on a short series.

pub mod math;
pub mod momentum;
pub mod snapshot;
pub mod trend;
pub mod volatility;
