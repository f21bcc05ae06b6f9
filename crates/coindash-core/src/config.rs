//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// 시장 데이터 API 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// 시장 데이터 API 설정.
///
/// CoinGecko 공개 API는 인증 없이 사용하는 대신 분당 호출 한도가 엄격하므로
/// 요청 큐의 한도/간격 값도 여기서 함께 관리합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// REST API 기본 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 가격 표시 통화 (CoinGecko `vs_currency`)
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 분당 요청 한도
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
    /// 연속 요청 사이의 최소 간격 (밀리초)
    #[serde(default = "default_min_interval_ms")]
    pub min_request_interval_ms: u64,
    /// 요청당 최대 시도 횟수
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 재시도 백오프 기준 시간 (밀리초, 지연 = 기준 * 2^시도)
    #[serde(default = "default_backoff_base_ms")]
    pub retry_backoff_base_ms: u64,
    /// 시계열 캐시 TTL (초)
    #[serde(default = "default_series_cache_ttl")]
    pub series_cache_ttl_secs: u64,
}

fn default_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}
fn default_vs_currency() -> String {
    "usd".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_rate_limit() -> u32 {
    50
}
fn default_min_interval_ms() -> u64 {
    2000
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    1000
}
fn default_series_cache_ttl() -> u64 {
    300
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            vs_currency: default_vs_currency(),
            timeout_secs: default_timeout_secs(),
            rate_limit_per_minute: default_rate_limit(),
            min_request_interval_ms: default_min_interval_ms(),
            max_attempts: default_max_attempts(),
            retry_backoff_base_ms: default_backoff_base_ms(),
            series_cache_ttl_secs: default_series_cache_ttl(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("COINDASH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
