//! 백엔드 호출 직렬화 요청 큐.
//!
//! 모든 아웃바운드 호출은 이 큐를 거칩니다. UI 쪽에서 몇 개의 화면이 동시에
//! 데이터를 요청하든, 백엔드 입장에서 보이는 호출량은 두 개의 게이트로 제한됩니다:
//!
//! - **롤링 윈도우 게이트**: 60초 윈도우당 요청 수 한도 (기본 50회)
//! - **최소 간격 게이트**: 연속 디스패치 사이 최소 간격 (기본 2초)
//!
//! # 동작 흐름
//!
//! ```text
//! enqueue(op) ──> FIFO 대기열 ──> 드레인 루프 (한 번에 하나)
//!                                    │
//!                              ┌─────▼─────┐
//!                              │ 윈도우 체크 │── 한도 도달 ──> 잔여 시간 대기
//!                              └─────┬─────┘
//!                              ┌─────▼─────┐
//!                              │ 간격 체크  │── 간격 미달 ──> 나머지 대기
//!                              └─────┬─────┘
//!                                    ▼
//!                          디스패치 + 재시도 실행 + 완료 대기
//! ```
//!
//! 드레인 루프는 항상 하나만 돌며(processing 플래그), 각 요청의 완료를 기다린 뒤
//! 다음 항목으로 넘어가므로 동시에 진행 중인 백엔드 호출은 최대 1개입니다.
//! 요청은 enqueue 순서(FIFO)대로 정확히 한 번 완료됩니다. 취소는 지원하지 않습니다.
//!
//! 모든 대기는 `tokio::time::sleep` 타이머 future를 await하는 방식이며,
//! 바쁜 대기는 없습니다.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::error::{MarketError, Result};
use crate::retry::{run_with_retry, RetryPolicy};

/// 요청 큐 게이트 설정.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// 윈도우당 최대 요청 수
    pub max_requests_per_window: u32,
    /// 롤링 윈도우 길이
    pub window: Duration,
    /// 연속 디스패치 사이 최소 간격
    pub min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: 50,
            window: Duration::from_secs(60),
            min_interval: Duration::from_secs(2),
        }
    }
}

/// 타입이 지워진 대기 작업. 자신의 oneshot 채널로 결과를 전달하고 끝납니다.
type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// 드레인 루프가 다음에 할 일.
enum Step {
    /// 헤드 작업 실행
    Run(Job),
    /// 게이트 충족까지 대기
    Wait(Duration),
    /// 대기열 비어 있음, 루프 종료
    Idle,
}

struct QueueState {
    pending: VecDeque<Job>,
    /// 드레인 루프 실행 중 여부 (중복 기동 방지)
    processing: bool,
    /// 현재 윈도우에서 디스패치된 요청 수
    request_count: u32,
    /// 현재 윈도우 시작 시각
    window_start: Instant,
    /// 마지막 디스패치 시각
    last_dispatch: Option<Instant>,
}

struct QueueInner {
    config: ThrottleConfig,
    retry: RetryPolicy,
    state: Mutex<QueueState>,
}

/// 공유 요청 큐 핸들.
///
/// 프로세스 시작 시 한 번 만들어 모든 호출자에게 `clone`으로 전달합니다.
/// 전역 싱글톤 대신 명시적으로 주입되는 소유 객체입니다.
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<QueueInner>,
}

impl RequestQueue {
    /// 새 요청 큐 생성.
    pub fn new(config: ThrottleConfig, retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                config,
                retry,
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    processing: false,
                    request_count: 0,
                    window_start: Instant::now(),
                    last_dispatch: None,
                }),
            }),
        }
    }

    /// 작업을 대기열에 넣고 완료를 기다립니다.
    ///
    /// 작업은 큐의 스케줄에 따라 비동기로 디스패치되며, 재시도까지 끝난 뒤
    /// 결과가 반환됩니다. 반환 future를 기다리는 동안에도 다른 enqueue는
    /// 자유롭게 쌓일 수 있습니다.
    pub async fn enqueue<T, F, Fut>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let retry = self.inner.retry.clone();

        let job: Job = Box::pin(async move {
            let result = run_with_retry(&retry, op).await;
            // 호출자가 기다림을 포기해도 큐 진행에는 영향 없음
            let _ = tx.send(result);
        });

        let start_drain = {
            let mut state = self.inner.state.lock().await;
            state.pending.push_back(job);
            if state.processing {
                false
            } else {
                state.processing = true;
                true
            }
        };

        if start_drain {
            let queue = self.clone();
            tokio::spawn(async move { queue.drain().await });
        }

        rx.await
            .map_err(|_| MarketError::Internal("request settled without a result".into()))?
    }

    /// 현재 대기 중인 작업 수.
    pub async fn pending_len(&self) -> usize {
        self.inner.state.lock().await.pending.len()
    }

    /// 드레인 루프. 대기열이 빌 때까지 게이트를 지키며 순차 실행합니다.
    async fn drain(&self) {
        loop {
            let step = self.next_step().await;

            match step {
                Step::Idle => return,
                Step::Wait(delay) => sleep(delay).await,
                // 순차 실행: 완료를 기다린 후에야 다음 항목을 본다
                Step::Run(job) => job.await,
            }
        }
    }

    /// 게이트를 평가하고 다음 행동을 결정합니다.
    ///
    /// 디스패치가 허용되면 헤드 작업을 꺼내면서 윈도우 카운터를 증가시킵니다.
    /// 카운트는 요청의 완료가 아니라 디스패치 시작 시점에 집계됩니다.
    async fn next_step(&self) -> Step {
        let config = &self.inner.config;
        let mut state = self.inner.state.lock().await;

        if state.pending.is_empty() {
            state.processing = false;
            trace!("대기열 비어 있음, 드레인 루프 종료");
            return Step::Idle;
        }

        let now = Instant::now();

        // 윈도우가 지났으면 카운터 리셋
        if now.duration_since(state.window_start) >= config.window {
            state.request_count = 0;
            state.window_start = now;
        }

        // 게이트 1: 롤링 윈도우 한도
        if state.request_count >= config.max_requests_per_window {
            let remaining = config.window - now.duration_since(state.window_start);
            debug!(
                in_window = state.request_count,
                remaining_ms = remaining.as_millis() as u64,
                "윈도우 한도 도달, 잔여 시간 대기"
            );
            return Step::Wait(remaining);
        }

        // 게이트 2: 최소 디스패치 간격
        if let Some(last) = state.last_dispatch {
            let since_last = now.duration_since(last);
            if since_last < config.min_interval {
                return Step::Wait(config.min_interval - since_last);
            }
        }

        match state.pending.pop_front() {
            Some(job) => {
                state.last_dispatch = Some(now);
                state.request_count += 1;
                trace!(
                    in_window = state.request_count,
                    queued = state.pending.len(),
                    "요청 디스패치"
                );
                Step::Run(job)
            }
            None => {
                state.processing = false;
                Step::Idle
            }
        }
    }
}
