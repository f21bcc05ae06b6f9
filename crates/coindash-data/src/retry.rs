//! 일시적 오류 재시도 드라이버.
//!
//! 각 시도의 결과를 에러 종류 태그(`MarketError::is_retryable`)로 검사하여
//! 재시도 여부를 결정합니다. 일시적 오류(429, 타임아웃, 연결 실패)만 재시도하고,
//! 그 외의 실패는 첫 발생 시 그대로 전파합니다.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{MarketError, Result};

/// 재시도 정책.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 총 시도 횟수 한도 (첫 시도 포함)
    pub max_attempts: u32,
    /// 백오프 기준 시간 (지연 = 기준 * 2^시도 번호)
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// 새 재시도 정책 생성.
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts,
            backoff_base,
        }
    }

    /// n번째 시도 실패 후 대기 시간.
    ///
    /// 기준 1초일 때 2초, 4초, ... 순서로 늘어납니다 (지터 없음).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt)
    }
}

/// 작업을 재시도 정책에 따라 실행합니다.
///
/// 성공하면 즉시 반환하고, 일시적 오류는 백오프 후 재시도합니다.
/// 한도에 도달하면 마지막 원인을 담은 `RetryExhausted`로 실패합니다.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error: Option<MarketError> = None;

    for attempt in 1..=policy.max_attempts {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "재시도 후 성공");
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() => {
                warn!(attempt, max_attempts = policy.max_attempts, error = %err, "일시적 오류, 재시도 예정");
                last_error = Some(err);

                if attempt < policy.max_attempts {
                    let delay = policy.backoff_delay(attempt);
                    debug!(delay_ms = delay.as_millis() as u64, "백오프 대기");
                    tokio::time::sleep(delay).await;
                }
            }
            // 재시도 불가능한 에러는 즉시 전파
            Err(err) => return Err(err),
        }
    }

    let source = last_error
        .unwrap_or_else(|| MarketError::Internal("retry driver finished without attempts".into()));

    Err(MarketError::RetryExhausted {
        attempts: policy.max_attempts,
        source: Box::new(source),
    })
}
