//! 에러 타입 정의.

use forex_core::ValidationError;
use forex_data::DataError;
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 데이터 조회/저장 에러
    #[error(transparent)]
    Data(#[from] DataError),

    /// 입력 검증 에러
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 출력 에러
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
