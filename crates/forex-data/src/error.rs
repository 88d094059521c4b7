//! 데이터 모듈 오류 타입.

use forex_core::ValidationError;
use thiserror::Error;

/// 데이터 수집/저장 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 입력 검증 오류
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 데이터 가져오기 오류 (외부 소스 연결 실패, HTTP 오류 등)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Provider가 심볼을 알지 못함
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// 외부 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 요청 범위에 데이터 없음
    #[error("No data for {symbol} in {range}")]
    NoData { symbol: String, range: String },

    /// 쿼리 실행 오류 또는 저장된 값이 올바르지 않음
    #[error("Database error: {0}")]
    Database(String),

    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    Connection(String),
}

impl DataError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::Fetch(_) | DataError::Timeout(_))
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                DataError::Connection(err.to_string())
            }
            sqlx::Error::Database(db_err) => DataError::Database(db_err.message().to_string()),
            _ => DataError::Database(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
