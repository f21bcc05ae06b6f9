//! # Coindash Core
//!
//! 암호화폐 대시보드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시장 데이터 구조체 (시장 목록, 가격 스냅샷, 시계열)
//! - 포트폴리오 보유 내역 및 평가
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use logging::*;
