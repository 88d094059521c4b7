//! 날짜 범위 타입.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::error::ValidationError;

/// 외부 입력 날짜 형식.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DD` 문자열을 날짜로 파싱합니다.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.trim().to_string()))
}

/// 양 끝을 포함하는 날짜 범위 (`start <= end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// 검증된 날짜 범위를 생성합니다.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// `YYYY-MM-DD` 문자열 두 개로 범위를 생성합니다.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// `end`에서 `days`일 전부터 `end`까지의 범위.
    pub fn ending_at(end: NaiveDate, days: u64) -> Self {
        let start = end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 날짜가 범위 안에 있는지 확인합니다.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 범위에 포함된 달력 일수.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}~{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}
