//! CoinGecko REST API 클라이언트.
//!
//! 이 모듈은 CoinGecko 공개 API(v3)의 읽기 전용 엔드포인트 4개를 제공합니다:
//!
//! - `/coins/markets`: 시가총액 순 시장 목록
//! - `/simple/price`: 코인 id 배치 현재가
//! - `/coins/{id}/market_chart`: 일수 기반 가격/거래량 시계열
//! - `/search`: 자유 텍스트 코인 검색
//!
//! 모든 요청은 GET + 쿼리 파라미터이며 인증이 없습니다. 429 응답은
//! `MarketError::RateLimited`로, 그 외 실패 상태는 상태 코드와 본문을 담은
//! `MarketError::ApiError`로 매핑됩니다.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

use coindash_core::{ApiConfig, MarketEntry, PricePoint, PriceSeries, PriceSnapshot, SearchHit};

use crate::error::{MarketError, Result};
use crate::provider::MarketSource;

/// CoinGecko 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 가격 표시 통화
    pub vs_currency: String,
    /// 요청 타임아웃
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: "usd".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl From<&ApiConfig> for CoinGeckoConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            vs_currency: config.vs_currency.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// CoinGecko REST API 클라이언트.
pub struct CoinGeckoClient {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoClient {
    /// 새 클라이언트 생성.
    pub fn new(config: CoinGeckoConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// GET 요청 후 JSON 역직렬화.
    ///
    /// 상태 코드 분류: 429 → RateLimited, 그 외 비성공 → ApiError.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(path, "CoinGecko API 호출");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketError::RateLimited);
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!(%status, path, "CoinGecko 요청 실패");
            return Err(MarketError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| MarketError::ParseError(format!("{} 응답 파싱 실패: {}", path, e)))
    }
}

#[async_trait]
impl MarketSource for CoinGeckoClient {
    async fn top_markets(&self, per_page: u32) -> Result<Vec<MarketEntry>> {
        self.get_json(
            "/coins/markets",
            &[
                ("vs_currency", self.config.vs_currency.clone()),
                ("order", "market_cap_desc".to_string()),
                ("per_page", per_page.to_string()),
                ("page", "1".to_string()),
                ("sparkline", "false".to_string()),
            ],
        )
        .await
    }

    async fn simple_prices(&self, ids: &[String]) -> Result<HashMap<String, PriceSnapshot>> {
        self.get_json(
            "/simple/price",
            &[
                ("ids", ids.join(",")),
                ("vs_currencies", self.config.vs_currency.clone()),
                ("include_24hr_change", "true".to_string()),
            ],
        )
        .await
    }

    async fn market_chart(&self, coin_id: &str, days: u32) -> Result<PriceSeries> {
        let path = format!("/coins/{}/market_chart", coin_id);
        let response: MarketChartResponse = self
            .get_json(
                &path,
                &[
                    ("vs_currency", self.config.vs_currency.clone()),
                    ("days", days.to_string()),
                ],
            )
            .await?;

        Ok(response.into_series())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response: SearchResponse = self
            .get_json("/search", &[("query", query.to_string())])
            .await?;

        Ok(response.coins)
    }
}

/// `/coins/{id}/market_chart` 응답.
///
/// 각 시계열은 `[밀리초 타임스탬프, 값]` 쌍의 배열입니다.
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
    #[serde(default)]
    market_caps: Vec<(f64, f64)>,
    #[serde(default)]
    total_volumes: Vec<(f64, f64)>,
}

impl MarketChartResponse {
    fn into_series(self) -> PriceSeries {
        PriceSeries {
            prices: to_points(self.prices),
            market_caps: to_points(self.market_caps),
            total_volumes: to_points(self.total_volumes),
        }
    }
}

/// `/search` 응답 (coins 외의 카테고리는 사용하지 않음).
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchHit>,
}

/// `[밀리초, 값]` 쌍을 시계열 점으로 변환. 변환 불가능한 점은 버립니다.
fn to_points(raw: Vec<(f64, f64)>) -> Vec<PricePoint> {
    raw.into_iter()
        .filter_map(|(ts_ms, value)| {
            let timestamp = Utc.timestamp_millis_opt(ts_ms as i64).single()?;
            let value = Decimal::from_f64_retain(value)?;
            Some(PricePoint { timestamp, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_chart_into_series() {
        let json = r#"{
            "prices": [[1705312800000, 42500.5], [1705316400000, 42810.0]],
            "market_caps": [[1705312800000, 830000000000.0]],
            "total_volumes": [[1705312800000, 18200000000.0]]
        }"#;

        let response: MarketChartResponse = serde_json::from_str(json).unwrap();
        let series = response.into_series();

        assert_eq!(series.prices.len(), 2);
        assert_eq!(series.market_caps.len(), 1);
        assert_eq!(series.prices[0].value, dec!(42500.5));
        assert_eq!(
            series.prices[0].timestamp,
            Utc.timestamp_millis_opt(1705312800000).unwrap()
        );
        // 시간 오름차순 유지
        assert!(series.prices[0].timestamp < series.prices[1].timestamp);
    }

    #[test]
    fn test_market_chart_missing_sections_default_empty() {
        let response: MarketChartResponse =
            serde_json::from_str(r#"{"prices": [[1705312800000, 1.0]]}"#).unwrap();
        let series = response.into_series();

        assert_eq!(series.prices.len(), 1);
        assert!(series.market_caps.is_empty());
        assert!(series.total_volumes.is_empty());
    }

    #[test]
    fn test_search_response_parses_coins() {
        let json = r#"{
            "coins": [
                {"id": "solana", "name": "Solana", "symbol": "SOL", "market_cap_rank": 5, "thumb": "https://example.com/sol.png"},
                {"id": "solend", "name": "Solend", "symbol": "SLND", "market_cap_rank": null, "thumb": null}
            ],
            "exchanges": []
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.coins.len(), 2);
        assert_eq!(response.coins[0].id, "solana");
        assert!(response.coins[1].market_cap_rank.is_none());
    }
}
