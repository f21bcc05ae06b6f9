//! 시장 데이터 서비스 파사드.
//!
//! UI 계층이 사용하는 4개 공개 작업을 제공합니다. 모든 작업은 공유 요청 큐를
//! 거치며(분당 한도 + 최소 간격 + 재시도), 시계열 조회만 캐시를 먼저 봅니다.
//! 캐시 적중은 큐와 재시도를 모두 우회합니다.
//!
//! | 작업 | 입력 | 출력 | 캐시 |
//! |---|---|---|---|
//! | `top_markets` | 페이지 크기 | 시가총액 순 목록 | 없음 |
//! | `price_snapshots` | 코인 id 집합 | id → 스냅샷 | 없음 |
//! | `price_history` | 코인 id, 일수 | 시계열 | 5분 |
//! | `search` | 검색어 | 검색 결과 | 없음 (디바운스는 호출자 몫) |

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use coindash_core::{ApiConfig, MarketEntry, PriceSeries, PriceSnapshot, SearchHit};

use crate::cache::SeriesCache;
use crate::error::Result;
use crate::provider::MarketSource;
use crate::retry::RetryPolicy;
use crate::throttle::{RequestQueue, ThrottleConfig};

/// 서비스 설정.
#[derive(Debug, Clone)]
pub struct MarketDataServiceConfig {
    /// 요청 큐 게이트 설정
    pub throttle: ThrottleConfig,
    /// 재시도 정책
    pub retry: RetryPolicy,
    /// 시계열 캐시 TTL
    pub series_cache_ttl: Duration,
}

impl Default for MarketDataServiceConfig {
    fn default() -> Self {
        Self {
            throttle: ThrottleConfig::default(),
            retry: RetryPolicy::default(),
            series_cache_ttl: Duration::from_secs(300),
        }
    }
}

impl From<&ApiConfig> for MarketDataServiceConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            throttle: ThrottleConfig {
                max_requests_per_window: config.rate_limit_per_minute,
                window: Duration::from_secs(60),
                min_interval: Duration::from_millis(config.min_request_interval_ms),
            },
            retry: RetryPolicy::new(
                config.max_attempts,
                Duration::from_millis(config.retry_backoff_base_ms),
            ),
            series_cache_ttl: Duration::from_secs(config.series_cache_ttl_secs),
        }
    }
}

/// 시장 데이터 서비스.
///
/// 프로세스 시작 시 한 번 생성하여 `Arc`로 공유합니다. 큐/캐시 상태는 모두
/// 이 객체가 소유합니다.
pub struct MarketDataService {
    source: Arc<dyn MarketSource>,
    queue: RequestQueue,
    series_cache: SeriesCache,
}

impl MarketDataService {
    /// 새 서비스 생성.
    pub fn new(source: Arc<dyn MarketSource>, config: MarketDataServiceConfig) -> Self {
        info!(
            rate_limit = config.throttle.max_requests_per_window,
            min_interval_ms = config.throttle.min_interval.as_millis() as u64,
            cache_ttl_secs = config.series_cache_ttl.as_secs(),
            "MarketDataService 초기화"
        );

        Self {
            source,
            queue: RequestQueue::new(config.throttle, config.retry),
            series_cache: SeriesCache::new(config.series_cache_ttl),
        }
    }

    /// 시가총액 순 상위 시장 목록.
    pub async fn top_markets(&self, per_page: u32) -> Result<Vec<MarketEntry>> {
        let source = Arc::clone(&self.source);
        self.queue
            .enqueue(move || {
                let source = Arc::clone(&source);
                async move { source.top_markets(per_page).await }
            })
            .await
    }

    /// 코인 id 집합의 현재가 스냅샷.
    pub async fn price_snapshots(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, PriceSnapshot>> {
        let source = Arc::clone(&self.source);
        let ids = ids.to_vec();
        self.queue
            .enqueue(move || {
                let source = Arc::clone(&source);
                let ids = ids.clone();
                async move { source.simple_prices(&ids).await }
            })
            .await
    }

    /// 일수 기반 가격/거래량 시계열 (5분 캐시).
    pub async fn price_history(&self, coin_id: &str, days: u32) -> Result<PriceSeries> {
        if let Some(series) = self.series_cache.get(coin_id, days).await {
            debug!(coin_id, days, "차트 캐시 적중, 큐 우회");
            return Ok(series);
        }

        let source = Arc::clone(&self.source);
        let id = coin_id.to_string();
        let series = self
            .queue
            .enqueue(move || {
                let source = Arc::clone(&source);
                let id = id.clone();
                async move { source.market_chart(&id, days).await }
            })
            .await?;

        self.series_cache.set(coin_id, days, series.clone()).await;
        Ok(series)
    }

    /// 자유 텍스트 코인 검색.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let source = Arc::clone(&self.source);
        let query = query.to_string();
        self.queue
            .enqueue(move || {
                let source = Arc::clone(&source);
                let query = query.clone();
                async move { source.search(&query).await }
            })
            .await
    }

    /// 시계열 캐시 전체 삭제 (강제 새로고침).
    pub async fn clear_history_cache(&self) {
        self.series_cache.clear().await;
    }
}
