//! CoinGecko 클라이언트/서비스 통합 테스트 (mockito HTTP 서버 사용).

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use rust_decimal_macros::dec;

use coindash_data::{
    CoinGeckoClient, CoinGeckoConfig, MarketDataService, MarketDataServiceConfig, MarketError,
    MarketSource, RetryPolicy, ThrottleConfig,
};

fn client_for(server: &mockito::Server) -> CoinGeckoClient {
    CoinGeckoClient::new(CoinGeckoConfig {
        base_url: server.url(),
        vs_currency: "usd".to_string(),
        timeout: Duration::from_secs(5),
    })
}

/// 게이트 대기 없이 빠르게 도는 서비스 (재시도 백오프는 수 밀리초).
fn fast_service(server: &mockito::Server) -> MarketDataService {
    let client = client_for(server);
    MarketDataService::new(
        Arc::new(client),
        MarketDataServiceConfig {
            throttle: ThrottleConfig {
                max_requests_per_window: 1000,
                window: Duration::from_secs(60),
                min_interval: Duration::ZERO,
            },
            retry: RetryPolicy::new(3, Duration::from_millis(5)),
            series_cache_ttl: Duration::from_secs(300),
        },
    )
}

const MARKETS_BODY: &str = r#"[
    {
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "current_price": 43250.12,
        "price_change_percentage_24h": 2.15,
        "market_cap": 845000000000,
        "market_cap_rank": 1,
        "high_24h": 43800.0,
        "low_24h": 42100.0,
        "last_updated": "2024-01-15T10:30:00.000Z"
    },
    {
        "id": "ethereum",
        "symbol": "eth",
        "name": "Ethereum",
        "current_price": 2520.55,
        "price_change_percentage_24h": -1.02,
        "market_cap": 303000000000,
        "market_cap_rank": 2,
        "high_24h": 2590.0,
        "low_24h": 2480.0,
        "last_updated": "2024-01-15T10:30:00.000Z"
    }
]"#;

#[tokio::test]
async fn test_top_markets_parses_listing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("vs_currency".into(), "usd".into()),
            Matcher::UrlEncoded("order".into(), "market_cap_desc".into()),
            Matcher::UrlEncoded("per_page".into(), "2".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("sparkline".into(), "false".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(MARKETS_BODY)
        .create_async()
        .await;

    let client = client_for(&server);
    let markets = client.top_markets(2).await.unwrap();

    mock.assert_async().await;
    assert_eq!(markets.len(), 2);
    assert_eq!(markets[0].id, "bitcoin");
    assert_eq!(markets[0].current_price, dec!(43250.12));
    assert_eq!(markets[1].market_cap_rank, Some(2));
    assert!(!markets[1].is_up_24h());
}

#[tokio::test]
async fn test_simple_prices_maps_ids() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/simple/price")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ids".into(), "bitcoin,ethereum".into()),
            Matcher::UrlEncoded("vs_currencies".into(), "usd".into()),
            Matcher::UrlEncoded("include_24hr_change".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{
                "bitcoin": {"usd": 43250.12, "usd_24h_change": 2.15},
                "ethereum": {"usd": 2520.55, "usd_24h_change": -1.02}
            }"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let ids = vec!["bitcoin".to_string(), "ethereum".to_string()];
    let prices = client.simple_prices(&ids).await.unwrap();

    mock.assert_async().await;
    assert_eq!(prices.len(), 2);
    assert_eq!(prices["bitcoin"].usd, dec!(43250.12));
    assert_eq!(prices["ethereum"].usd_24h_change, Some(dec!(-1.02)));
}

#[tokio::test]
async fn test_market_chart_converts_pairs() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/coins/bitcoin/market_chart")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("vs_currency".into(), "usd".into()),
            Matcher::UrlEncoded("days".into(), "7".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{
                "prices": [[1705312800000, 42500.5], [1705316400000, 42810.0]],
                "market_caps": [[1705312800000, 830000000000.0]],
                "total_volumes": [[1705312800000, 18200000000.0]]
            }"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let series = client.market_chart("bitcoin", 7).await.unwrap();

    mock.assert_async().await;
    assert_eq!(series.prices.len(), 2);
    assert_eq!(series.prices[0].value, dec!(42500.5));
    assert!(series.prices[0].timestamp < series.prices[1].timestamp);
}

#[tokio::test]
async fn test_search_parses_hits() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("query".into(), "sol".into()))
        .with_status(200)
        .with_body(
            r#"{"coins": [{"id": "solana", "name": "Solana", "symbol": "SOL", "market_cap_rank": 5, "thumb": null}]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let hits = client.search("sol").await.unwrap();

    mock.assert_async().await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "solana");
}

#[tokio::test]
async fn test_429_maps_to_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.search("sol").await;

    assert!(matches!(result, Err(MarketError::RateLimited)));
}

#[tokio::test]
async fn test_error_status_maps_to_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/coins/unknown/market_chart")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error": "coin not found"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.market_chart("unknown", 7).await;

    match result {
        Err(MarketError::ApiError { status, message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("coin not found"));
        }
        other => panic!("ApiError 기대, 실제: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_parse_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.top_markets(10).await;

    assert!(matches!(result, Err(MarketError::ParseError(_))));
}

#[tokio::test]
async fn test_service_does_not_retry_terminal_404() {
    let mut server = mockito::Server::new_async().await;
    // expect(1): 404는 재시도 없이 첫 시도에서 그대로 전파되어야 함
    let mock = server
        .mock("GET", "/coins/missing/market_chart")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error": "coin not found"}"#)
        .expect(1)
        .create_async()
        .await;

    let service = fast_service(&server);
    let result = service.price_history("missing", 7).await;

    mock.assert_async().await;
    assert!(matches!(
        result,
        Err(MarketError::ApiError { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_service_retries_429_to_exhaustion() {
    let mut server = mockito::Server::new_async().await;
    // expect(3): 한도(3회)까지 모두 429를 맞고 RetryExhausted로 끝나야 함
    let mock = server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::Any)
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let service = fast_service(&server);
    let result = service.top_markets(10).await;

    mock.assert_async().await;
    match result {
        Err(MarketError::RetryExhausted { attempts, source }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, MarketError::RateLimited));
        }
        other => panic!("RetryExhausted 기대, 실제: {:?}", other),
    }
}

#[tokio::test]
async fn test_service_caches_market_chart() {
    let mut server = mockito::Server::new_async().await;
    // expect(1): 두 번째 조회는 캐시 적중으로 서버까지 오지 않아야 함
    let mock = server
        .mock("GET", "/coins/bitcoin/market_chart")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"prices": [[1705312800000, 42500.5]], "market_caps": [], "total_volumes": []}"#)
        .expect(1)
        .create_async()
        .await;

    let service = fast_service(&server);
    let first = service.price_history("bitcoin", 7).await.unwrap();
    let second = service.price_history("bitcoin", 7).await.unwrap();

    mock.assert_async().await;
    assert_eq!(first.prices[0].value, second.prices[0].value);
}
