//! 환율 데이터 조회 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 과거 환율 Provider (`HistoricalRateProvider`, Yahoo Finance 구현)
//! - 타임아웃/재시도 래퍼
//! - 인메모리 SQLite 저장소
//! - Provider와 저장소를 묶는 데이터 매니저

pub mod error;
pub mod manager;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use manager::ForexDataManager;

pub use provider::{
    normalize_quotes, DailyQuote, HistoricalRateProvider, RetryPolicy, RetryingProvider,
    YahooRateProvider,
};
pub use storage::{PriceStore, SymbolSummary, IN_MEMORY_URL};
