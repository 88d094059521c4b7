//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use forex_core::ValidationError;
use forex_data::DataError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "INVALID_SYMBOL",
///   "message": "Invalid symbol: 'EUR USD'",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_SYMBOL", "NO_DATA", "FETCH_ERROR")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

/// 핸들러 에러 (상태 코드 + JSON 본문).
pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

/// 400 에러 생성.
pub fn bad_request(code: &str, message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ApiErrorResponse::new(code, message)))
}

/// 입력 검증 에러를 400 응답으로 변환합니다.
pub fn validation_error(err: &ValidationError) -> ApiError {
    let code = match err {
        ValidationError::InvalidSymbol(_) => "INVALID_SYMBOL",
        ValidationError::InvalidCurrency(_) => "INVALID_CURRENCY",
        ValidationError::InvalidDate(_) => "INVALID_DATE",
        ValidationError::InvalidRange { .. } => "INVALID_DATE_RANGE",
        ValidationError::InvalidPeriod(_) => "INVALID_PERIOD",
        ValidationError::Config(_) => "INVALID_INPUT",
    };
    bad_request(code, err.to_string())
}

/// 데이터 계층 에러를 HTTP 응답으로 변환합니다.
pub fn data_error(err: &DataError) -> ApiError {
    let (status, code) = match err {
        DataError::Validation(v) => return validation_error(v),
        DataError::NoData { .. } => (StatusCode::NOT_FOUND, "NO_DATA"),
        DataError::SymbolNotFound(_) => (StatusCode::NOT_FOUND, "SYMBOL_NOT_FOUND"),
        DataError::Fetch(_) => (StatusCode::BAD_GATEWAY, "FETCH_ERROR"),
        DataError::Parse(_) => (StatusCode::BAD_GATEWAY, "PARSE_ERROR"),
        DataError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "FETCH_TIMEOUT"),
        DataError::Database(_) | DataError::Connection(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR")
        }
    };
    (status, Json(ApiErrorResponse::new(code, err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.timestamp.is_some());

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["code"], "TEST_ERROR");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_data_error_status_mapping() {
        let cases = vec![
            (
                DataError::NoData {
                    symbol: "EURUSD=X".into(),
                    range: "2024-01-01~2024-01-02".into(),
                },
                StatusCode::NOT_FOUND,
                "NO_DATA",
            ),
            (
                DataError::SymbolNotFound("NOPE=X".into()),
                StatusCode::NOT_FOUND,
                "SYMBOL_NOT_FOUND",
            ),
            (DataError::Fetch("down".into()), StatusCode::BAD_GATEWAY, "FETCH_ERROR"),
            (DataError::Parse("bad chart".into()), StatusCode::BAD_GATEWAY, "PARSE_ERROR"),
            (DataError::Timeout("30s".into()), StatusCode::GATEWAY_TIMEOUT, "FETCH_TIMEOUT"),
            (
                DataError::Database("locked".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "DB_ERROR",
            ),
            (
                DataError::Validation(ValidationError::InvalidSymbol("a b".into())),
                StatusCode::BAD_REQUEST,
                "INVALID_SYMBOL",
            ),
        ];

        for (err, status, code) in cases {
            let (actual_status, Json(body)) = data_error(&err);
            assert_eq!(actual_status, status);
            assert_eq!(body.code, code);
        }
    }
}
