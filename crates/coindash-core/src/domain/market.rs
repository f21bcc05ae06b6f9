//! 시장 데이터 타입 및 구조체.
//!
//! 이 모듈은 시장 데이터 관련 타입을 정의합니다:
//! - `MarketEntry` - 시가총액 순 시장 목록 항목
//! - `PriceSnapshot` - 코인별 현재가 스냅샷
//! - `PricePoint` / `PriceSeries` - 가격/거래량 시계열
//! - `SearchHit` - 코인 검색 결과
//!
//! serde 필드명은 CoinGecko 응답 형식을 그대로 따르므로 별도의 rename 없이
//! 역직렬화할 수 있습니다. 응답에서 null이 될 수 있는 필드는 `Option`입니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시장 목록 항목 (`/coins/markets` 응답 한 건).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEntry {
    /// 코인 식별자 (예: "bitcoin")
    pub id: String,
    /// 티커 심볼 (예: "btc")
    pub symbol: String,
    /// 코인 이름
    pub name: String,
    /// 현재가
    pub current_price: Decimal,
    /// 24시간 변동률 (%)
    pub price_change_percentage_24h: Option<Decimal>,
    /// 시가총액
    pub market_cap: Option<Decimal>,
    /// 시가총액 순위
    pub market_cap_rank: Option<u32>,
    /// 24시간 최고가
    pub high_24h: Option<Decimal>,
    /// 24시간 최저가
    pub low_24h: Option<Decimal>,
    /// 마지막 갱신 시각
    pub last_updated: Option<DateTime<Utc>>,
}

impl MarketEntry {
    /// 24시간 변동이 상승인지 확인합니다.
    pub fn is_up_24h(&self) -> bool {
        self.price_change_percentage_24h
            .map(|pct| pct > Decimal::ZERO)
            .unwrap_or(false)
    }
}

/// 코인별 현재가 스냅샷 (`/simple/price` 응답의 값 부분).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// USD 현재가
    pub usd: Decimal,
    /// 24시간 변동률 (%)
    pub usd_24h_change: Option<Decimal>,
}

/// 시계열의 한 점 (타임스탬프 + 값).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 관측 시각
    pub timestamp: DateTime<Utc>,
    /// 값 (가격, 시가총액 또는 거래량)
    pub value: Decimal,
}

/// 가격/시가총액/거래량 시계열 (`/coins/{id}/market_chart` 응답).
///
/// 각 시계열은 시간 오름차순입니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    /// 가격 시계열
    pub prices: Vec<PricePoint>,
    /// 시가총액 시계열
    pub market_caps: Vec<PricePoint>,
    /// 거래량 시계열
    pub total_volumes: Vec<PricePoint>,
}

impl PriceSeries {
    /// 가장 최근 가격을 반환합니다.
    pub fn latest_price(&self) -> Option<&PricePoint> {
        self.prices.last()
    }

    /// 시계열이 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// 코인 검색 결과 (`/search` 응답의 `coins` 항목).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// 코인 식별자
    pub id: String,
    /// 코인 이름
    pub name: String,
    /// 티커 심볼
    pub symbol: String,
    /// 시가총액 순위
    pub market_cap_rank: Option<u32>,
    /// 썸네일 이미지 URL
    pub thumb: Option<String>,
}
