//! API 서버용 HTTP middleware.
//!
//! CORS, 요청 타임아웃, 요청 트레이싱을 라우터에 적용합니다.

use axum::http::{header, Method, StatusCode};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use forex_core::ServerConfig;
use forex_data::RetryPolicy;

use crate::routes::create_api_router;
use crate::state::AppState;

/// 조회 최대 시간 위에 더하는 요청 타임아웃 여유분.
pub const FETCH_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS` 환경변수(쉼표 구분)가 있으면 해당 origin만 허용합니다.
pub fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// 실제로 적용할 HTTP 요청 타임아웃.
///
/// 수집 endpoint는 재시도를 모두 소진할 때까지 응답하지 않으므로, 요청
/// 타임아웃은 항상 `policy.max_elapsed()` + 여유분 이상이어야 합니다.
/// 설정값이 이보다 짧으면 경고를 남기고 늘려서 사용합니다.
pub fn request_timeout(server: &ServerConfig, policy: &RetryPolicy) -> Duration {
    let configured = server.request_timeout();
    let fetch_budget = policy.max_elapsed().saturating_add(FETCH_TIMEOUT_MARGIN);

    if configured < fetch_budget {
        warn!(
            configured_secs = configured.as_secs(),
            effective_secs = fetch_budget.as_secs(),
            "request_timeout_secs가 조회 최대 시간보다 짧아 늘려서 적용합니다"
        );
        fetch_budget
    } else {
        configured
    }
}

/// 전체 라우터에 상태와 공통 미들웨어를 적용합니다.
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}
