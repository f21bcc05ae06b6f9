//! 시장 데이터 Provider 모듈.
//!
//! ## CoinGecko
//! - `CoinGeckoClient`: CoinGecko 공개 REST API 클라이언트 (인증 불필요)
//! - 시가총액 순 시장 목록, 배치 현재가, 일수 기반 차트 시계열, 코인 검색
//!
//! 서비스 계층은 구체 클라이언트 대신 `MarketSource` 트레잇에 의존하므로
//! 테스트에서 스크립트된 소스로 대체할 수 있습니다.

pub mod coingecko;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig};

use std::collections::HashMap;

use async_trait::async_trait;

use coindash_core::{MarketEntry, PriceSeries, PriceSnapshot, SearchHit};

use crate::error::Result;

/// 시장 데이터 백엔드 추상화.
///
/// 네 가지 읽기 전용 조회만 제공합니다. 호출 빈도 제어는 이 트레잇의 책임이
/// 아니라 요청 큐의 책임입니다.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// 시가총액 순 상위 시장 목록.
    async fn top_markets(&self, per_page: u32) -> Result<Vec<MarketEntry>>;

    /// 코인 id 집합의 현재가 스냅샷 (id → 스냅샷).
    async fn simple_prices(&self, ids: &[String]) -> Result<HashMap<String, PriceSnapshot>>;

    /// 코인 하나의 일수 기반 가격/거래량 시계열.
    async fn market_chart(&self, coin_id: &str, days: u32) -> Result<PriceSeries>;

    /// 자유 텍스트 코인 검색.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}
