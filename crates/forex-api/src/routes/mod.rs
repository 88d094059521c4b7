//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/forex` - 저장된 환율 조회
//! - `/api/v1/forex` - 환율 조회/수집/심볼 현황

pub mod forex;
pub mod health;

pub use forex::{
    forex_router, FetchPeriodRequest, FetchRangeRequest, FetchResponse, ForexQuery,
    SymbolsResponse,
};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        .route("/forex", get(forex::get_forex))
        // API v1 엔드포인트
        .nest("/api/v1/forex", forex_router())
}
