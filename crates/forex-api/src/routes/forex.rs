//! 환율 조회/수집 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /forex`, `GET /api/v1/forex` - 저장된 환율 조회
//! - `POST /api/v1/forex/fetch` - 날짜 범위 조회 후 저장
//! - `POST /api/v1/forex/fetch-period` - 통화쌍 + 기간으로 조회 후 저장
//! - `GET /api/v1/forex/symbols` - 저장된 심볼 현황

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use forex_core::{parse_date, DateRange, ForexSymbol, Period, PriceRecord};
use forex_data::SymbolSummary;

use crate::error::{bad_request, data_error, validation_error, ApiResult};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 환율 조회 쿼리.
#[derive(Debug, Default, Deserialize)]
pub struct ForexQuery {
    /// 심볼 (예: EURUSD=X)
    pub symbol: Option<String>,
    /// 시작 날짜 (선택, YYYY-MM-DD)
    pub start: Option<String>,
    /// 종료 날짜 (선택, YYYY-MM-DD)
    pub end: Option<String>,
}

/// 날짜 범위 수집 요청.
#[derive(Debug, Deserialize)]
pub struct FetchRangeRequest {
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
}

/// 기간 수집 요청.
#[derive(Debug, Deserialize)]
pub struct FetchPeriodRequest {
    /// 기준 통화 (예: GBP)
    pub from: String,
    /// 상대 통화 (예: INR)
    pub to: String,
    /// 기간 (예: 1W, 3M, 1Y)
    pub period: String,
}

/// 수집 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct FetchResponse {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub fetched_count: usize,
    pub records: Vec<PriceRecord>,
}

/// 저장된 심볼 목록 응답.
#[derive(Debug, Serialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<SymbolSummary>,
    pub total: usize,
}

// ==================== 핸들러 ====================

/// 저장된 환율 조회.
///
/// GET /forex?symbol=EURUSD=X&start=2024-01-01&end=2024-01-10
///
/// 일치하는 데이터가 없으면 빈 배열을 반환합니다.
pub async fn get_forex(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForexQuery>,
) -> ApiResult<Json<Vec<PriceRecord>>> {
    let raw_symbol = query
        .symbol
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("MISSING_SYMBOL", "symbol 파라미터가 필요합니다"))?;
    let symbol = ForexSymbol::parse(raw_symbol).map_err(|e| validation_error(&e))?;

    let start = parse_optional_date(query.start.as_deref(), "INVALID_START_DATE", "시작")?;
    let end = parse_optional_date(query.end.as_deref(), "INVALID_END_DATE", "종료")?;
    if let (Some(start), Some(end)) = (start, end) {
        DateRange::new(start, end).map_err(|e| validation_error(&e))?;
    }

    let records = state
        .manager
        .query(&symbol, start, end)
        .await
        .map_err(|e| {
            error!(symbol = %symbol, error = %e, "환율 조회 실패");
            data_error(&e)
        })?;

    Ok(Json(records))
}

/// 날짜 범위를 Provider에서 조회해 저장.
///
/// POST /api/v1/forex/fetch
pub async fn fetch_range(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FetchRangeRequest>, JsonRejection>,
) -> ApiResult<Json<FetchResponse>> {
    let Json(req) = payload.map_err(invalid_body)?;

    let symbol = ForexSymbol::parse(&req.symbol).map_err(|e| validation_error(&e))?;
    let start = parse_required_date(&req.start_date, "INVALID_START_DATE", "시작")?;
    let end = parse_required_date(&req.end_date, "INVALID_END_DATE", "종료")?;
    let range = DateRange::new(start, end).map_err(|e| validation_error(&e))?;

    fetch_and_respond(&state, symbol, range).await
}

/// 통화쌍과 기간으로 오늘까지의 데이터를 조회해 저장.
///
/// POST /api/v1/forex/fetch-period
pub async fn fetch_period(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FetchPeriodRequest>, JsonRejection>,
) -> ApiResult<Json<FetchResponse>> {
    let Json(req) = payload.map_err(invalid_body)?;

    let symbol = ForexSymbol::from_pair(&req.from, &req.to).map_err(|e| validation_error(&e))?;
    let period: Period = req.period.parse().map_err(|e| validation_error(&e))?;
    let range = period.window_ending(Utc::now().date_naive());

    fetch_and_respond(&state, symbol, range).await
}

/// 저장된 심볼 현황.
///
/// GET /api/v1/forex/symbols
pub async fn list_symbols(State(state): State<Arc<AppState>>) -> ApiResult<Json<SymbolsResponse>> {
    let symbols = state.manager.summaries().await.map_err(|e| data_error(&e))?;
    let total = symbols.len();
    Ok(Json(SymbolsResponse { symbols, total }))
}

// ==================== 헬퍼 ====================

async fn fetch_and_respond(
    state: &AppState,
    symbol: ForexSymbol,
    range: DateRange,
) -> ApiResult<Json<FetchResponse>> {
    info!(symbol = %symbol, range = %range, "환율 수집 요청");

    match state.manager.fetch_and_store(&symbol, range).await {
        Ok(records) => {
            info!(symbol = %symbol, count = records.len(), "환율 수집 완료");
            Ok(Json(FetchResponse {
                symbol: symbol.to_string(),
                start_date: range.start(),
                end_date: range.end(),
                fetched_count: records.len(),
                records,
            }))
        }
        Err(e) => {
            error!(symbol = %symbol, range = %range, error = %e, "환율 수집 실패");
            Err(data_error(&e))
        }
    }
}

fn parse_optional_date(
    raw: Option<&str>,
    code: &str,
    label: &str,
) -> ApiResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_required_date(raw, code, label).map(Some),
        None => Ok(None),
    }
}

fn parse_required_date(raw: &str, code: &str, label: &str) -> ApiResult<NaiveDate> {
    parse_date(raw)
        .map_err(|_| bad_request(code, format!("{} 날짜 형식 오류 (YYYY-MM-DD): '{}'", label, raw)))
}

fn invalid_body(rejection: JsonRejection) -> crate::error::ApiError {
    bad_request("INVALID_REQUEST_BODY", rejection.body_text())
}

/// 환율 라우터 생성.
pub fn forex_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_forex))
        .route("/fetch", post(fetch_range))
        .route("/fetch-period", post(fetch_period))
        .route("/symbols", get(list_symbols))
}
