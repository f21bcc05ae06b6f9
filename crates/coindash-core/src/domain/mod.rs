//! 도메인 모델.
//!
//! 시장 데이터와 포트폴리오 평가에 사용되는 타입들을 정의합니다.

pub mod market;
pub mod portfolio;

pub use market::{MarketEntry, PricePoint, PriceSeries, PriceSnapshot, SearchHit};
pub use portfolio::{Holding, HoldingValuation, PortfolioSummary};
