//! 조회 기간 표기 (`1W`, `3M`, `1Y` 등).
//!
//! 오늘을 기준으로 한 rolling window를 표현합니다.
//! 월은 30일, 연은 365일로 환산합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::DateRange;

/// 기간 단위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    fn days(self) -> u64 {
        match self {
            PeriodUnit::Day => 1,
            PeriodUnit::Week => 7,
            PeriodUnit::Month => 30,
            PeriodUnit::Year => 365,
        }
    }

    fn suffix(self) -> char {
        match self {
            PeriodUnit::Day => 'D',
            PeriodUnit::Week => 'W',
            PeriodUnit::Month => 'M',
            PeriodUnit::Year => 'Y',
        }
    }
}

/// 오늘 기준 과거 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    count: u32,
    unit: PeriodUnit,
}

impl Period {
    /// 최대 기간 (약 50년).
    const MAX_DAYS: u64 = 365 * 50;

    pub fn new(count: u32, unit: PeriodUnit) -> Result<Self, ValidationError> {
        let period = Self { count, unit };
        if count == 0 || period.days() > Self::MAX_DAYS {
            return Err(ValidationError::InvalidPeriod(period.to_string()));
        }
        Ok(period)
    }

    /// 기간의 총 일수.
    pub fn days(&self) -> u64 {
        u64::from(self.count) * self.unit.days()
    }

    /// `today`로 끝나는 날짜 범위.
    pub fn window_ending(&self, today: NaiveDate) -> DateRange {
        DateRange::ending_at(today, self.days())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_uppercase();
        let invalid = || ValidationError::InvalidPeriod(s.trim().to_string());

        let unit = match raw.chars().last() {
            Some('D') => PeriodUnit::Day,
            Some('W') => PeriodUnit::Week,
            Some('M') => PeriodUnit::Month,
            Some('Y') => PeriodUnit::Year,
            _ => return Err(invalid()),
        };
        let digits = &raw[..raw.len() - 1];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let count: u32 = digits.parse().map_err(|_| invalid())?;

        Self::new(count, unit).map_err(|_| invalid())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
