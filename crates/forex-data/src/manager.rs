//! 데이터 매니저 구현.
//!
//! Provider 조회와 저장소 사이를 조정합니다. 조회한 레코드는
//! 곧바로 저장소에 upsert되며, 읽기는 항상 저장소에서 수행합니다.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument};

use forex_core::{DateRange, ForexSymbol, PriceRecord};

use crate::error::Result;
use crate::provider::HistoricalRateProvider;
use crate::storage::{PriceStore, SymbolSummary};

/// Provider와 저장소를 묶는 중앙 데이터 매니저.
#[derive(Clone)]
pub struct ForexDataManager {
    provider: Arc<dyn HistoricalRateProvider>,
    store: PriceStore,
}

impl ForexDataManager {
    pub fn new(provider: Arc<dyn HistoricalRateProvider>, store: PriceStore) -> Self {
        Self { provider, store }
    }

    /// Provider에서 조회한 뒤 저장소에 저장합니다.
    ///
    /// 저장된 레코드를 날짜 오름차순으로 반환합니다.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn fetch_and_store(
        &self,
        symbol: &ForexSymbol,
        range: DateRange,
    ) -> Result<Vec<PriceRecord>> {
        let records = self.provider.fetch(symbol, range).await?;
        let written = self.store.insert(&records).await?;

        info!(symbol = %symbol, range = %range, written = written, "환율 데이터 저장");
        Ok(records)
    }

    /// 저장소에서 조회합니다.
    pub async fn query(
        &self,
        symbol: &ForexSymbol,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceRecord>> {
        self.store.query(symbol, start, end).await
    }

    /// 저장된 심볼별 현황.
    pub async fn summaries(&self) -> Result<Vec<SymbolSummary>> {
        self.store.summaries().await
    }

    pub fn store(&self) -> &PriceStore {
        &self.store
    }

    /// Provider 이름.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
