//! Integration tests for the Finnhub provider against a mocked API

use chrono::{Duration, Utc};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use swingforge::services::finnhub::FinnhubProvider;
use swingforge::services::MarketDataProvider;

async fn mock_quote(server: &MockServer, symbol: &str, price: f64) {
    Mock::given(method("GET"))
        .and(path("/quote"))
        .and(query_param("symbol", symbol))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "c": price,
            "h": price + 1.0,
            "l": price - 1.0,
            "o": price,
            "pc": price,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn quote_parses_the_current_price() {
    let server = MockServer::start().await;
    mock_quote(&server, "AAPL", 51.25).await;

    let provider = FinnhubProvider::new(server.uri(), "test-key");
    let quote = provider.get_quote("AAPL").await.unwrap();
    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(quote.price, 51.25);
}

#[tokio::test]
async fn zero_price_quote_is_unavailable() {
    let server = MockServer::start().await;
    mock_quote(&server, "AAPL", 0.0).await;

    let provider = FinnhubProvider::new(server.uri(), "test-key");
    assert!(provider.get_quote("AAPL").await.is_none());
}

#[tokio::test]
async fn failed_quote_falls_back_to_last_known() {
    let server = MockServer::start().await;
    mock_quote(&server, "AAPL", 48.0).await;

    let provider = FinnhubProvider::new(server.uri(), "test-key");
    assert_eq!(provider.get_quote("AAPL").await.unwrap().price, 48.0);

    // The API goes down; the cached value is served after retries.
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let quote = provider.get_quote("AAPL").await.unwrap();
    assert_eq!(quote.price, 48.0);
}

#[tokio::test]
async fn failed_quote_without_history_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = FinnhubProvider::new(server.uri(), "test-key");
    assert!(provider.get_quote("AAPL").await.is_none());
}

#[tokio::test]
async fn candles_parse_and_sort_ascending() {
    let server = MockServer::start().await;
    // Timestamps deliberately out of order.
    Mock::given(method("GET"))
        .and(path("/stock/candle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "s": "ok",
            "t": [1_700_086_400, 1_700_000_000],
            "o": [51.0, 50.0],
            "h": [52.0, 51.0],
            "l": [50.5, 49.5],
            "c": [51.5, 50.5],
            "v": [900_000.0, 1_000_000.0],
        })))
        .mount(&server)
        .await;

    let provider = FinnhubProvider::new(server.uri(), "test-key");
    let to = Utc::now();
    let candles = provider
        .get_candles("AAPL", to - Duration::days(5), to, "D")
        .await;

    assert_eq!(candles.len(), 2);
    assert!(candles[0].timestamp < candles[1].timestamp);
    assert_eq!(candles[0].close, 50.5);
    assert_eq!(candles[1].close, 51.5);
}

#[tokio::test]
async fn no_data_status_yields_empty_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/candle"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "s": "no_data" })),
        )
        .mount(&server)
        .await;

    let provider = FinnhubProvider::new(server.uri(), "test-key");
    let to = Utc::now();
    let candles = provider
        .get_candles("AAPL", to - Duration::days(5), to, "D")
        .await;
    assert!(candles.is_empty());
}
