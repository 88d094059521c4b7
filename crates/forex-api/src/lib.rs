//! 환율 조회 REST API.
//!
//! 저장소에 쌓인 일별 환율을 조회하고, 필요 시 Provider에서 즉시 가져와
//! 저장하는 HTTP 엔드포인트를 제공합니다.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use middleware::{create_router, request_timeout};
pub use routes::create_api_router;
pub use state::AppState;
