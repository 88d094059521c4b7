//! 입력 검증 에러 타입.
//!
//! 심볼, 날짜, 기간, 설정 값처럼 시스템 경계에서 들어오는 값의
//! 검증 실패를 표현합니다.

use thiserror::Error;

/// 경계 입력 검증 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 잘못된 통화쌍 심볼
    #[error("잘못된 심볼: {0}")]
    InvalidSymbol(String),

    /// 잘못된 통화 코드 (ISO 4217 3자리)
    #[error("잘못된 통화 코드: {0}")]
    InvalidCurrency(String),

    /// 잘못된 날짜 형식 (YYYY-MM-DD)
    #[error("잘못된 날짜 형식 (YYYY-MM-DD): {0}")]
    InvalidDate(String),

    /// 시작일이 종료일보다 늦음
    #[error("시작 날짜({start})가 종료 날짜({end})보다 늦습니다")]
    InvalidRange { start: String, end: String },

    /// 잘못된 기간 표기 (예: 1W, 3M, 1Y)
    #[error("잘못된 기간 형식: {0} (예: 1W, 1M, 1Y)")]
    InvalidPeriod(String),

    /// 잘못된 설정 값
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 검증 작업을 위한 Result 타입.
pub type ValidationResult<T> = Result<T, ValidationError>;
