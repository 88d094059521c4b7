//! 일별 환율 OHLCV 레코드.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ForexSymbol;

/// 하루치 환율 가격 레코드.
///
/// (`symbol`, `date`) 쌍이 저장소의 키입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// 통화쌍 심볼
    pub symbol: ForexSymbol,
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 수정 종가 (외환은 보통 종가와 동일)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<Decimal>,
    /// 거래량 (외환은 대부분 0)
    #[serde(default)]
    pub volume: i64,
}

impl PriceRecord {
    /// 새 레코드를 생성합니다.
    pub fn new(
        symbol: ForexSymbol,
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> Self {
        Self {
            symbol,
            date,
            open,
            high,
            low,
            close,
            adj_close: None,
            volume: 0,
        }
    }

    /// 수정 종가를 설정합니다.
    pub fn with_adj_close(mut self, adj_close: Decimal) -> Self {
        self.adj_close = Some(adj_close);
        self
    }

    /// 거래량을 설정합니다.
    pub fn with_volume(mut self, volume: i64) -> Self {
        self.volume = volume;
        self
    }
}
