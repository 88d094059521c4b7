//! 주기 수집 스케줄러.
//!
//! # 동작 방식
//!
//! 1. 매 틱마다 (심볼 × 기간) 작업 목록을 오늘 날짜 기준으로 계산
//! 2. `max_concurrent_fetches` 만큼만 동시에 조회 후 저장
//! 3. 실패는 로그와 통계에만 남기고 다음 틱은 그대로 실행
//! 4. 밀린 틱은 몰아서 실행하지 않고 건너뜀 (틱끼리 겹치지 않음)
//! 5. 종료 토큰이 취소되면 진행 중인 틱을 중단하고 반환
//!
//! 정기 주기 외에 `daily_at`이 설정되어 있으면 매일 해당 시각(UTC)에도 실행합니다.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use forex_data::{DataError, ForexDataManager};

use crate::config::SchedulePlan;
use crate::stats::CollectionStats;

/// 주기 수집 스케줄러.
pub struct Scheduler {
    manager: ForexDataManager,
    plan: SchedulePlan,
}

impl Scheduler {
    pub fn new(manager: ForexDataManager, plan: SchedulePlan) -> Self {
        Self { manager, plan }
    }

    /// 한 번의 수집 사이클을 실행합니다.
    ///
    /// 개별 작업 실패는 에러로 전파되지 않고 통계에 집계됩니다.
    pub async fn run_tick(&self, today: NaiveDate) -> CollectionStats {
        let started = Instant::now();
        let mut stats = CollectionStats::new();
        let jobs = self.plan.jobs(today);
        stats.total = jobs.len();

        let manager = &self.manager;
        let results: Vec<_> = stream::iter(jobs)
            .map(|(symbol, range)| async move {
                let result = manager.fetch_and_store(&symbol, range).await;
                (symbol, range, result)
            })
            .buffer_unordered(self.plan.max_concurrent_fetches.max(1))
            .collect()
            .await;

        for (symbol, range, result) in results {
            match result {
                Ok(records) => {
                    stats.success += 1;
                    stats.total_records += records.len();
                    debug!(symbol = %symbol, range = %range, records = records.len(), "수집 및 저장 완료");
                }
                Err(DataError::NoData { .. }) => {
                    stats.empty += 1;
                    warn!(symbol = %symbol, range = %range, "데이터 없음");
                }
                Err(e) => {
                    stats.errors += 1;
                    error!(symbol = %symbol, range = %range, error = %e, "수집 실패");
                }
            }
        }

        stats.elapsed = started.elapsed();
        stats
    }

    /// 종료 토큰이 취소될 때까지 스케줄을 실행합니다.
    pub async fn run(self, shutdown: CancellationToken) {
        let period = self.plan.interval;
        let first = if self.plan.run_on_start {
            tokio::time::Instant::now()
        } else {
            tokio::time::Instant::now() + period
        };
        let mut interval = tokio::time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            symbols = self.plan.symbols.len(),
            windows = self.plan.windows.len(),
            interval_secs = period.as_secs(),
            daily_at = ?self.plan.daily_at,
            max_concurrent = self.plan.max_concurrent_fetches,
            "=== 스케줄러 시작 ==="
        );

        loop {
            let daily = self.plan.daily_at.map(|at| until_next_daily(at, Utc::now()));

            let trigger = tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => "interval",
                _ = sleep_or_pending(daily) => "daily",
            };

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(trigger = trigger, "수집 중 종료 신호 수신");
                    break;
                }
                stats = self.run_tick(Utc::now().date_naive()) => {
                    stats.log_summary(trigger);
                }
            }
        }

        info!("스케줄러 종료");
    }

    /// 백그라운드 태스크로 실행합니다.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

/// `now` 이후 가장 가까운 `at`(UTC)까지 남은 시간.
pub fn until_next_daily(at: NaiveTime, now: DateTime<Utc>) -> Duration {
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now {
        today
    } else {
        today
            .checked_add_days(Days::new(1))
            .unwrap_or(today)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

async fn sleep_or_pending(delay: Option<Duration>) {
    match delay {
        Some(delay) => tokio::time::sleep(delay).await,
        None => std::future::pending().await,
    }
}
