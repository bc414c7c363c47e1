//! Market data primitives: candles, quotes, trading sessions.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. Series are always ordered ascending by timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Last traded price for a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            fetched_at: Utc::now(),
        }
    }
}

/// US equity market session, approximated in UTC.
///
/// Regular hours are taken as 14:30-21:00 UTC (9:30-16:00 ET under DST);
/// the one-hour standard-time drift is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketSession {
    PreMarket,
    Regular,
    AfterHours,
    Closed,
}

impl MarketSession {
    pub fn at(time: DateTime<Utc>) -> Self {
        if matches!(time.weekday(), Weekday::Sat | Weekday::Sun) {
            return MarketSession::Closed;
        }
        let minutes = time.hour() * 60 + time.minute();
        match minutes {
            m if (540..870).contains(&m) => MarketSession::PreMarket,
            m if (870..1260).contains(&m) => MarketSession::Regular,
            m if (1260..1440).contains(&m) => MarketSession::AfterHours,
            _ => MarketSession::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketSession::PreMarket => "PRE_MARKET",
            MarketSession::Regular => "REGULAR",
            MarketSession::AfterHours => "AFTER_HOURS",
            MarketSession::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PRE_MARKET" => Some(MarketSession::PreMarket),
            "REGULAR" => Some(MarketSession::Regular),
            "AFTER_HOURS" => Some(MarketSession::AfterHours),
            "CLOSED" => Some(MarketSession::Closed),
            _ => None,
        }
    }
}
