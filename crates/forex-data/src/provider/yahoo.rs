//! Yahoo Finance 환율 Provider.
//!
//! chart API의 일봉(`1d`)을 조회해 `PriceRecord`로 정규화합니다.
//!
//! # 정규화 규칙
//!
//! - 가격이 NaN/무한대/0 이하인 행은 버립니다.
//! - 타임스탬프는 거래소 GMT 오프셋을 적용해 달력 날짜로 변환합니다.
//! - 요청 범위 밖의 날짜는 버립니다.
//! - 같은 날짜가 여러 번 오면 마지막 값을 사용합니다.
//! - 결과는 날짜 오름차순입니다.
//!
//! # 오류 분류
//!
//! - chart API가 `Not Found`를 돌려주면 `SymbolNotFound` (재시도하지 않음)
//! - 응답 역직렬화 실패나 불일치는 `Parse`
//! - 결과나 quote가 비어 있으면 `NoData`
//! - 나머지 요청 실패는 `Fetch`

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api::YahooError;

use forex_core::{DateRange, ForexSymbol, PriceRecord, ValidationError};

use super::HistoricalRateProvider;
use crate::error::{DataError, Result};

/// 가격 소수점 자릿수.
pub const PRICE_SCALE: u32 = 6;

/// Yahoo 일봉 interval.
const DAILY_INTERVAL: &str = "1d";

/// Provider 응답의 원시 일봉.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyQuote {
    /// Unix 타임스탬프 (초)
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl From<&yahoo_finance_api::Quote> for DailyQuote {
    fn from(q: &yahoo_finance_api::Quote) -> Self {
        Self {
            timestamp: q.timestamp as i64,
            open: q.open,
            high: q.high,
            low: q.low,
            close: q.close,
            adj_close: q.adjclose,
            volume: q.volume,
        }
    }
}

/// Yahoo Finance Provider.
pub struct YahooRateProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooRateProvider {
    pub fn new() -> Result<Self> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| DataError::Connection(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl HistoricalRateProvider for YahooRateProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &ForexSymbol, range: DateRange) -> Result<Vec<PriceRecord>> {
        // Yahoo의 period2는 배타적이므로 종료일 다음 날 0시까지 요청
        let start = naive_date_to_offset_datetime(range.start())?;
        let end = naive_date_to_offset_datetime(range.end().succ_opt().unwrap_or(range.end()))?;

        debug!(
            symbol = %symbol,
            interval = DAILY_INTERVAL,
            range = %range,
            "Yahoo Finance API 날짜 범위 호출"
        );

        let response = self
            .connector
            .get_quote_history_interval(symbol.as_str(), start, end, DAILY_INTERVAL)
            .await
            .map_err(|e| request_error(symbol, e))?;

        let gmt_offset = response
            .metadata()
            .map(|meta| meta.gmtoffset as i64)
            .unwrap_or(0);

        let quotes = response.quotes().map_err(|e| quotes_error(symbol, range, e))?;

        let raw: Vec<DailyQuote> = quotes.iter().map(DailyQuote::from).collect();
        let records = normalize_quotes(symbol, &raw, range, gmt_offset);

        if records.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                range: range.to_string(),
            });
        }

        debug!(
            symbol = %symbol,
            raw = raw.len(),
            records = records.len(),
            "Yahoo Finance 응답 정규화 완료"
        );

        Ok(records)
    }
}

/// chart API 요청 오류를 분류합니다.
fn request_error(symbol: &ForexSymbol, err: YahooError) -> DataError {
    match err {
        YahooError::ApiError(ref message)
            if message
                .code
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case("Not Found")) =>
        {
            DataError::SymbolNotFound(format!("{} ({})", symbol, err))
        }
        YahooError::DeserializeFailed(_) | YahooError::DataInconsistency => {
            DataError::Parse(format!("Yahoo Finance 응답 파싱 오류 ({}): {}", symbol, err))
        }
        other => DataError::Fetch(format!("Yahoo Finance API 오류 ({}): {}", symbol, other)),
    }
}

/// `YResponse::quotes` 오류를 분류합니다.
fn quotes_error(symbol: &ForexSymbol, range: DateRange, err: YahooError) -> DataError {
    match err {
        YahooError::NoQuotes | YahooError::NoResult => DataError::NoData {
            symbol: symbol.to_string(),
            range: range.to_string(),
        },
        other => DataError::Parse(format!("Quote 파싱 오류 ({}): {}", symbol, other)),
    }
}

/// 원시 일봉을 정렬/필터링된 레코드로 변환합니다.
pub fn normalize_quotes(
    symbol: &ForexSymbol,
    quotes: &[DailyQuote],
    range: DateRange,
    gmt_offset_secs: i64,
) -> Vec<PriceRecord> {
    let mut by_date: BTreeMap<NaiveDate, PriceRecord> = BTreeMap::new();

    for quote in quotes {
        let Some(date) = DateTime::from_timestamp(quote.timestamp + gmt_offset_secs, 0)
            .map(|dt| dt.date_naive())
        else {
            continue;
        };
        if !range.contains(date) {
            continue;
        }

        let (Some(open), Some(high), Some(low), Some(close)) = (
            to_price(quote.open),
            to_price(quote.high),
            to_price(quote.low),
            to_price(quote.close),
        ) else {
            continue;
        };

        let mut record = PriceRecord::new(symbol.clone(), date, open, high, low, close)
            .with_volume(i64::try_from(quote.volume).unwrap_or(i64::MAX));
        if let Some(adj_close) = to_price(quote.adj_close) {
            record = record.with_adj_close(adj_close);
        }

        by_date.insert(date, record);
    }

    by_date.into_values().collect()
}

/// 유효한 양수 가격만 Decimal로 변환.
fn to_price(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Decimal::from_f64(value).map(|d| d.round_dp(PRICE_SCALE).normalize())
}

/// NaiveDate를 UTC 자정 OffsetDateTime으로 변환.
fn naive_date_to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
    let invalid = || DataError::Validation(ValidationError::InvalidDate(date.to_string()));
    let month = time::Month::try_from(date.month() as u8).map_err(|_| invalid())?;
    let day = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
        .map_err(|_| invalid())?;
    Ok(day.midnight().assume_utc())
}
