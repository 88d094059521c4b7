//! 통화쌍 심볼 정의.
//!
//! Yahoo Finance 형식의 외환 심볼(`EURUSD=X`)을 검증된 타입으로 다룹니다.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// 심볼 최대 길이.
const MAX_SYMBOL_LEN: usize = 32;

/// Yahoo Finance 외환 심볼 접미사.
pub const FOREX_SUFFIX: &str = "=X";

/// 검증된 통화쌍 심볼.
///
/// 대문자로 정규화되며 영숫자와 `=`, `^`, `.`, `-`, `_`만 허용합니다.
/// 예: `EURUSD=X`, `GBPINR=X`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ForexSymbol(String);

impl ForexSymbol {
    /// 문자열을 검증하여 심볼을 생성합니다.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::InvalidSymbol("빈 심볼".to_string()));
        }
        if trimmed.len() > MAX_SYMBOL_LEN {
            return Err(ValidationError::InvalidSymbol(format!(
                "{} (최대 {}자)",
                trimmed, MAX_SYMBOL_LEN
            )));
        }
        if !trimmed.chars().next().is_some_and(|c| c.is_ascii_alphanumeric() || c == '^') {
            return Err(ValidationError::InvalidSymbol(trimmed.to_string()));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '=' | '^' | '.' | '-' | '_'))
        {
            return Err(ValidationError::InvalidSymbol(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// 두 통화 코드로 Yahoo 외환 심볼을 만듭니다.
    ///
    /// `from_pair("eur", "usd")` → `EURUSD=X`
    pub fn from_pair(base: &str, quote: &str) -> Result<Self, ValidationError> {
        let base = currency_code(base)?;
        let quote = currency_code(quote)?;
        Ok(Self(format!("{}{}{}", base, quote, FOREX_SUFFIX)))
    }

    /// 심볼 문자열.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Yahoo 외환 표기(`=X`)인지 확인합니다.
    pub fn is_yahoo_forex(&self) -> bool {
        self.0.ends_with(FOREX_SUFFIX)
    }

    /// `EURUSD=X` 형식이면 (기준 통화, 호가 통화)를 반환합니다.
    pub fn currencies(&self) -> Option<(&str, &str)> {
        let pair = self.0.strip_suffix(FOREX_SUFFIX)?;
        if pair.len() == 6 && pair.chars().all(|c| c.is_ascii_alphabetic()) {
            Some((&pair[..3], &pair[3..]))
        } else {
            None
        }
    }
}

fn currency_code(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(ValidationError::InvalidCurrency(code.to_string()))
    }
}

impl fmt::Display for ForexSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ForexSymbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ForexSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ForexSymbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
