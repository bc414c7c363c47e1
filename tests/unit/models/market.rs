//! Unit tests for market session classification

use chrono::{TimeZone, Utc};
use swingforge::models::market::MarketSession;

#[test]
fn weekend_is_closed() {
    // 2024-01-06 was a Saturday.
    let t = Utc.with_ymd_and_hms(2024, 1, 6, 16, 0, 0).unwrap();
    assert_eq!(MarketSession::at(t), MarketSession::Closed);
    let t = Utc.with_ymd_and_hms(2024, 1, 7, 16, 0, 0).unwrap();
    assert_eq!(MarketSession::at(t), MarketSession::Closed);
}

#[test]
fn weekday_sessions_by_utc_minute() {
    // 2024-01-08 was a Monday.
    let at = |h, m| Utc.with_ymd_and_hms(2024, 1, 8, h, m, 0).unwrap();
    assert_eq!(MarketSession::at(at(2, 0)), MarketSession::Closed);
    assert_eq!(MarketSession::at(at(9, 0)), MarketSession::PreMarket);
    assert_eq!(MarketSession::at(at(14, 29)), MarketSession::PreMarket);
    assert_eq!(MarketSession::at(at(14, 30)), MarketSession::Regular);
    assert_eq!(MarketSession::at(at(20, 59)), MarketSession::Regular);
    assert_eq!(MarketSession::at(at(21, 0)), MarketSession::AfterHours);
    assert_eq!(MarketSession::at(at(23, 59)), MarketSession::AfterHours);
}

#[test]
fn session_string_round_trip() {
    for session in [
        MarketSession::PreMarket,
        MarketSession::Regular,
        MarketSession::AfterHours,
        MarketSession::Closed,
    ] {
        assert_eq!(MarketSession::parse(session.as_str()), Some(session));
    }
    assert!(MarketSession::parse("LUNCH").is_none());
}
