//! 외부 환율 데이터 Provider 모듈.
//!
//! ## Yahoo Finance
//! - `YahooRateProvider`: Yahoo Finance chart API 기반 일봉 조회
//!
//! ## 재시도
//! - `RetryingProvider`: 타임아웃 + 지수 백오프 재시도 래퍼
//!
//! 모든 Provider는 `HistoricalRateProvider` trait을 구현하며,
//! 결과는 날짜 오름차순으로 정렬되고 요청 범위 안의 날짜만 포함합니다.

pub mod retry;
pub mod yahoo;

pub use retry::{RetryPolicy, RetryingProvider};
pub use yahoo::{normalize_quotes, DailyQuote, YahooRateProvider};

use async_trait::async_trait;
use forex_core::{DateRange, ForexSymbol, PriceRecord};

use crate::error::Result;

/// 과거 환율 데이터 Provider.
#[async_trait]
pub trait HistoricalRateProvider: Send + Sync {
    /// Provider 이름 (로그용).
    fn name(&self) -> &str;

    /// 심볼의 일별 레코드를 조회합니다.
    ///
    /// 반환값은 날짜 오름차순이며 모든 날짜가 `range` 안에 있습니다.
    /// 데이터가 없으면 `DataError::NoData`를 반환합니다.
    async fn fetch(&self, symbol: &ForexSymbol, range: DateRange) -> Result<Vec<PriceRecord>>;
}
