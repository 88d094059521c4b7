//! 타임아웃과 재시도를 적용하는 Provider 래퍼.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use forex_core::{DateRange, FetcherConfig, ForexSymbol, PriceRecord};

use super::HistoricalRateProvider;
use crate::error::{DataError, Result};

/// 백오프 대기 상한.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// 재시도 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (최소 1)
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간 (시도마다 2배)
    pub base_delay: Duration,
    /// 시도 1회당 타임아웃
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetcherConfig::default())
    }
}

impl From<&FetcherConfig> for RetryPolicy {
    fn from(config: &FetcherConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_base_delay(),
            timeout: config.timeout(),
        }
    }
}

impl RetryPolicy {
    /// `attempt`번째 실패 후 대기 시간 (jitter 제외).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// 모든 시도가 타임아웃될 때 한 번의 조회가 걸릴 수 있는 최대 시간.
    ///
    /// 시도별 타임아웃과 최대 jitter를 포함한 백오프의 합입니다.
    pub fn max_elapsed(&self) -> Duration {
        (1..self.max_attempts).fold(
            self.timeout.saturating_mul(self.max_attempts),
            |total, attempt| {
                let backoff = self.backoff(attempt);
                total.saturating_add(backoff).saturating_add(backoff / 4)
            },
        )
    }

    fn backoff_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.backoff(attempt);
        let jitter_ms = (base.as_millis() / 4) as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// 시도마다 타임아웃을 걸고 재시도 가능한 실패를 재시도하는 Provider.
pub struct RetryingProvider {
    inner: Arc<dyn HistoricalRateProvider>,
    policy: RetryPolicy,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn HistoricalRateProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn attempt(&self, symbol: &ForexSymbol, range: DateRange) -> Result<Vec<PriceRecord>> {
        match tokio::time::timeout(self.policy.timeout, self.inner.fetch(symbol, range)).await {
            Ok(result) => result,
            Err(_) => Err(DataError::Timeout(format!(
                "{} {} ({}초 초과)",
                symbol,
                range,
                self.policy.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl HistoricalRateProvider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, symbol: &ForexSymbol, range: DateRange) -> Result<Vec<PriceRecord>> {
        let mut attempt = 1;
        loop {
            match self.attempt(symbol, range).await {
                Ok(records) => return Ok(records),
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff_with_jitter(attempt);
                    warn!(
                        provider = self.inner.name(),
                        symbol = %symbol,
                        attempt = attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "조회 실패, 재시도 예정"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// 처음 `failures`번 실패한 뒤 성공하는 Provider.
    struct FlakyProvider {
        calls: AtomicU32,
        failures: u32,
        error: fn() -> DataError,
        hang: bool,
    }

    impl FlakyProvider {
        fn new(failures: u32, error: fn() -> DataError) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures,
                error,
                hang: false,
            }
        }
    }

    #[async_trait]
    impl HistoricalRateProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch(&self, symbol: &ForexSymbol, range: DateRange) -> Result<Vec<PriceRecord>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.hang {
                std::future::pending::<()>().await;
            }
            if call <= self.failures {
                return Err((self.error)());
            }
            Ok(vec![PriceRecord::new(
                symbol.clone(),
                range.start(),
                dec!(1.1),
                dec!(1.2),
                dec!(1.0),
                dec!(1.15),
            )])
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(100),
            timeout: Duration::from_secs(5),
        }
    }

    fn args() -> (ForexSymbol, DateRange) {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        (
            ForexSymbol::parse("EURUSD=X").unwrap(),
            DateRange::new(day, day).unwrap(),
        )
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let p = policy(5);
        assert_eq!(p.backoff(1), Duration::from_millis(100));
        assert_eq!(p.backoff(2), Duration::from_millis(200));
        assert_eq!(p.backoff(3), Duration::from_millis(400));
        assert_eq!(p.backoff(40), MAX_BACKOFF);
    }

    #[test]
    fn test_max_elapsed_covers_timeouts_and_backoff() {
        let p = policy(3);
        // 5s × 3 + (100ms + 25ms) + (200ms + 50ms)
        assert_eq!(p.max_elapsed(), Duration::from_millis(15_375));
        assert_eq!(policy(1).max_elapsed(), Duration::from_secs(5));

        let defaults = RetryPolicy::default();
        assert!(defaults.max_elapsed() > defaults.timeout * defaults.max_attempts);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures() {
        let flaky = Arc::new(FlakyProvider::new(2, || DataError::Fetch("reset".into())));
        let provider = RetryingProvider::new(flaky.clone(), policy(3));
        let (symbol, range) = args();

        let records = provider.fetch(&symbol, range).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let flaky = Arc::new(FlakyProvider::new(10, || DataError::Fetch("down".into())));
        let provider = RetryingProvider::new(flaky.clone(), policy(3));
        let (symbol, range) = args();

        let err = provider.fetch(&symbol, range).await.unwrap_err();
        assert!(matches!(err, DataError::Fetch(_)));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_data_is_not_retried() {
        let flaky = Arc::new(FlakyProvider::new(10, || DataError::NoData {
            symbol: "EURUSD=X".into(),
            range: "2024-01-02~2024-01-02".into(),
        }));
        let provider = RetryingProvider::new(flaky.clone(), policy(3));
        let (symbol, range) = args();

        assert!(matches!(
            provider.fetch(&symbol, range).await,
            Err(DataError::NoData { .. })
        ));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_symbol_is_not_retried() {
        let flaky = Arc::new(FlakyProvider::new(10, || {
            DataError::SymbolNotFound("NOPE=X".into())
        }));
        let provider = RetryingProvider::new(flaky.clone(), policy(3));
        let (symbol, range) = args();

        assert!(matches!(
            provider.fetch(&symbol, range).await,
            Err(DataError::SymbolNotFound(_))
        ));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_each_attempt() {
        let mut hanging = FlakyProvider::new(0, || DataError::Fetch("unused".into()));
        hanging.hang = true;
        let hanging = Arc::new(hanging);
        let provider = RetryingProvider::new(hanging.clone(), policy(2));
        let (symbol, range) = args();

        let err = provider.fetch(&symbol, range).await.unwrap_err();
        assert!(matches!(err, DataError::Timeout(_)));
        assert_eq!(hanging.calls.load(Ordering::SeqCst), 2);
    }
}
