//! 환율 주기 수집기.
//!
//! 이 crate는 API 서버와 독립적으로도 실행할 수 있는 수집 기능을 제공합니다:
//! - 스케줄 계획 검증 (`SchedulePlan`)
//! - 심볼 × 기간 작업을 제한된 동시성으로 수집하는 스케줄러
//! - 단발성 조회 후 저장소 재조회 (CLI `fetch`)

pub mod config;
pub mod error;
pub mod oneshot;
pub mod scheduler;
pub mod stats;

pub use config::{CollectorConfig, SchedulePlan, Window};
pub use error::{CollectorError, Result};
pub use oneshot::{fetch_once, FetchReport};
pub use scheduler::Scheduler;
pub use stats::CollectionStats;
