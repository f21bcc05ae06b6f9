//! 시장 데이터 에러 타입.

use thiserror::Error;

/// 시장 데이터 관련 에러.
#[derive(Debug, Error)]
pub enum MarketError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 요청 한도 초과 (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// API 에러 응답 (4xx/5xx)
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 재시도 한도 도달 (마지막 원인 포함)
    #[error("Max retries exceeded after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<MarketError>,
    },

    /// 내부 에러 (요청 큐 인프라 등)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// 재시도 가능한 에러인지 확인.
    ///
    /// 429와 네트워크 수준 오류(타임아웃/연결 실패)만 일시적 오류로 취급합니다.
    /// 그 외의 API 오류는 첫 발생 시 즉시 전파됩니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MarketError::NetworkError(_) | MarketError::Timeout(_) | MarketError::RateLimited
        )
    }

    /// 재시도 한도 도달 에러인지 확인.
    ///
    /// 호출자는 이 경우 일시적 장애로 안내하고 다시 시도 버튼을 제공해야 합니다.
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, MarketError::RetryExhausted { .. })
    }
}

impl From<reqwest::Error> for MarketError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MarketError::Timeout(err.to_string())
        } else if err.is_connect() {
            MarketError::NetworkError(err.to_string())
        } else if err.is_decode() {
            MarketError::ParseError(err.to_string())
        } else {
            MarketError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        MarketError::ParseError(err.to_string())
    }
}

/// 시장 데이터 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, MarketError>;
