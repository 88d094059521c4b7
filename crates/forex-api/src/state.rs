//! 애플리케이션 상태.
//!
//! 모든 핸들러가 `Arc<AppState>`로 공유합니다.

use chrono::{DateTime, Utc};

use forex_data::{ForexDataManager, PriceStore};

/// 애플리케이션 상태.
pub struct AppState {
    /// Provider + 저장소
    pub manager: ForexDataManager,
    /// API 버전
    pub version: String,
    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,
    /// 주기 수집 설명 (비활성화 시 None)
    pub scheduler: Option<String>,
}

impl AppState {
    pub fn new(manager: ForexDataManager) -> Self {
        Self {
            manager,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            scheduler: None,
        }
    }

    /// 주기 수집 정보를 설정합니다.
    #[must_use]
    pub fn with_scheduler(mut self, description: impl Into<String>) -> Self {
        self.scheduler = Some(description.into());
        self
    }

    pub fn store(&self) -> &PriceStore {
        self.manager.store()
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 저장소 연결 상태.
    pub async fn is_store_healthy(&self) -> bool {
        self.store().ping().await
    }
}

/// 테스트용 AppState 생성.
///
/// 항상 데이터가 없다고 응답하는 Provider와 빈 인메모리 저장소를 사용합니다.
#[cfg(test)]
pub async fn create_test_state() -> AppState {
    use async_trait::async_trait;
    use forex_core::{DateRange, ForexSymbol, PriceRecord};
    use forex_data::{DataError, HistoricalRateProvider};
    use std::sync::Arc;

    struct EmptyProvider;

    #[async_trait]
    impl HistoricalRateProvider for EmptyProvider {
        fn name(&self) -> &str {
            "empty"
        }

        async fn fetch(
            &self,
            symbol: &ForexSymbol,
            range: DateRange,
        ) -> forex_data::Result<Vec<PriceRecord>> {
            Err(DataError::NoData {
                symbol: symbol.to_string(),
                range: range.to_string(),
            })
        }
    }

    let store = PriceStore::in_memory()
        .await
        .expect("in-memory store for tests");
    AppState::new(ForexDataManager::new(Arc::new(EmptyProvider), store))
}
