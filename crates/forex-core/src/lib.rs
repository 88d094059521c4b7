//! # Forex Core
//!
//! 환율 수집 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! - 일별 환율 레코드 (`PriceRecord`)
//! - 검증된 통화쌍 심볼, 날짜 범위, 기간 표기
//! - 입력 검증 에러
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
