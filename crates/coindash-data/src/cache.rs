//! 시계열 응답 캐시.
//!
//! (코인 id, 일수) 키로 차트 시계열을 TTL 동안 보관합니다. 캐시 적중은
//! 요청 큐와 재시도를 모두 우회하므로, 같은 차트를 여러 화면이 반복 요청해도
//! 백엔드 호출은 TTL당 한 번으로 줄어듭니다.
//!
//! 만료된 항목은 조회 시점에 지연 제거됩니다.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, trace};

use coindash_core::PriceSeries;

/// 캐시 키: (코인 id, 요청 일수).
type SeriesKey = (String, u32);

struct CacheEntry {
    series: PriceSeries,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_stale(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }
}

/// 시계열 TTL 캐시.
pub struct SeriesCache {
    ttl: Duration,
    entries: RwLock<HashMap<SeriesKey, CacheEntry>>,
}

impl SeriesCache {
    /// 주어진 TTL로 캐시 생성.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 캐시 조회. TTL 이내의 항목만 반환하고, 만료된 항목은 제거합니다.
    pub async fn get(&self, coin_id: &str, days: u32) -> Option<PriceSeries> {
        let key = (coin_id.to_string(), days);

        // 빠른 경로: 읽기 잠금으로 신선한 항목 확인
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if !entry.is_stale(self.ttl) => {
                    trace!(coin_id, days, "시계열 캐시 적중");
                    return Some(entry.series.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // 만료 항목 지연 제거 (쓰기 잠금으로 재확인 후 삭제)
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(&key) {
            if !entry.is_stale(self.ttl) {
                return Some(entry.series.clone());
            }
            entries.remove(&key);
            debug!(coin_id, days, "만료된 시계열 캐시 제거");
        }

        None
    }

    /// 캐시에 저장. 같은 키의 기존 항목은 무조건 덮어씁니다.
    pub async fn set(&self, coin_id: &str, days: u32, series: PriceSeries) {
        let mut entries = self.entries.write().await;
        entries.insert(
            (coin_id.to_string(), days),
            CacheEntry {
                series,
                fetched_at: Instant::now(),
            },
        );
    }

    /// 모든 항목 삭제 (강제 새로고침용).
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        debug!(dropped, "시계열 캐시 전체 삭제");
    }

    /// 현재 보관 중인 항목 수 (만료 여부와 무관).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// 캐시가 비어 있는지 확인.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
