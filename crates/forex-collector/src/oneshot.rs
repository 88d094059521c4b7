//! 단발성 조회 모듈.
//!
//! 한 심볼/범위를 조회해 저장한 뒤 저장소에서 다시 읽어 반환합니다.

use serde::Serialize;
use std::io::Write;

use forex_core::{DateRange, ForexSymbol, PriceRecord};
use forex_data::ForexDataManager;

use crate::error::Result;

/// 단발성 조회 결과.
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub symbol: ForexSymbol,
    pub range: DateRange,
    /// Provider에서 받은 레코드
    pub fetched: Vec<PriceRecord>,
    /// 저장 후 저장소에서 다시 조회한 레코드
    pub stored: Vec<PriceRecord>,
}

/// 조회 → 저장 → 재조회.
pub async fn fetch_once(
    manager: &ForexDataManager,
    symbol: &ForexSymbol,
    range: DateRange,
) -> Result<FetchReport> {
    tracing::info!(symbol = %symbol, range = %range, provider = manager.provider_name(), "단발성 조회 시작");

    let fetched = manager.fetch_and_store(symbol, range).await?;
    let stored = manager
        .query(symbol, Some(range.start()), Some(range.end()))
        .await?;

    Ok(FetchReport {
        symbol: symbol.clone(),
        range,
        fetched,
        stored,
    })
}

impl FetchReport {
    /// 사람이 읽기 좋은 표 형태로 출력합니다.
    pub fn write_table<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{} {} ({} rows fetched)", self.symbol, self.range, self.fetched.len())?;
        writeln!(
            out,
            "{:<12} {:>14} {:>14} {:>14} {:>14} {:>14} {:>12}",
            "date", "open", "high", "low", "close", "adj_close", "volume"
        )?;
        for record in &self.stored {
            let adj_close = record
                .adj_close
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "{:<12} {:>14} {:>14} {:>14} {:>14} {:>14} {:>12}",
                record.date.to_string(),
                record.open.to_string(),
                record.high.to_string(),
                record.low.to_string(),
                record.close.to_string(),
                adj_close,
                record.volume
            )?;
        }
        writeln!(out, "{} rows stored", self.stored.len())?;
        Ok(())
    }

    /// JSON으로 출력합니다.
    pub fn write_json<W: Write>(&self, out: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)
            .map_err(|e| crate::error::CollectorError::Io(e.into()))?;
        writeln!(out)?;
        Ok(())
    }
}
