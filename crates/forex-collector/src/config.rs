//! 수집 설정 모듈.
//!
//! `AppConfig`의 `scheduler` 섹션(원시 문자열)을 시작 시점에 한 번 검증해
//! `SchedulePlan`으로 변환합니다. 잘못된 심볼, 기간, 날짜, 0분 주기는
//! 모두 시작을 중단시킵니다.

use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use forex_core::{parse_date, AppConfig, DateRange, ForexSymbol, Period, SchedulerConfig, ValidationError};

use crate::error::{CollectorError, Result};

/// `daily_at` 시각 형식.
const DAILY_AT_FORMAT: &str = "%H:%M";

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 로드된 애플리케이션 설정
    pub app: AppConfig,
    /// 검증된 스케줄 계획
    pub plan: SchedulePlan,
}

/// `.env`를 읽은 뒤 애플리케이션 설정만 로드합니다.
///
/// 스케줄 계획은 검증하지 않으므로 단발성 조회처럼 스케줄러를 쓰지 않는
/// 경로에서 사용합니다.
pub fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    AppConfig::load(path).map_err(|e| CollectorError::Config(e.to_string()))
}

impl CollectorConfig {
    /// `.env`, 설정 파일, 환경 변수 순으로 설정을 로드하고 검증합니다.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let app = load_app_config(path)?;
        let plan = SchedulePlan::from_config(&app.scheduler)?;
        Ok(Self { app, plan })
    }
}

/// 수집 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// 고정 날짜 범위
    Fixed(DateRange),
    /// 틱마다 오늘 기준으로 계산되는 기간
    Rolling(Period),
}

impl Window {
    /// 주어진 날짜를 기준으로 실제 조회 범위를 계산합니다.
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        match self {
            Window::Fixed(range) => *range,
            Window::Rolling(period) => period.window_ending(today),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Fixed(range) => write!(f, "{}", range),
            Window::Rolling(period) => write!(f, "{}", period),
        }
    }
}

/// 검증된 스케줄 계획.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePlan {
    pub symbols: Vec<ForexSymbol>,
    pub windows: Vec<Window>,
    /// 정기 실행 주기
    pub interval: Duration,
    /// 매일 추가 실행 시각 (UTC)
    pub daily_at: Option<NaiveTime>,
    /// 틱당 동시 수집 작업 수 (최소 1)
    pub max_concurrent_fetches: usize,
    /// 시작 직후 즉시 실행 여부
    pub run_on_start: bool,
}

impl SchedulePlan {
    /// 원시 스케줄러 설정을 검증합니다.
    ///
    /// `start_date`/`end_date`가 모두 있으면 고정 범위 하나를 사용하고,
    /// 없으면 `periods`의 각 기간을 오늘 기준 기간으로 사용합니다.
    pub fn from_config(config: &SchedulerConfig) -> Result<Self> {
        let symbols = config
            .symbols
            .iter()
            .map(|s| ForexSymbol::parse(s))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if symbols.is_empty() {
            return Err(config_error("scheduler.symbols가 비어 있습니다"));
        }

        let windows = match (&config.start_date, &config.end_date) {
            (Some(start), Some(end)) => vec![Window::Fixed(DateRange::parse(start, end)?)],
            (None, None) => config
                .periods
                .iter()
                .map(|p| p.parse::<Period>().map(Window::Rolling))
                .collect::<std::result::Result<Vec<_>, _>>()?,
            _ => {
                return Err(config_error(
                    "scheduler.start_date와 scheduler.end_date는 함께 지정해야 합니다",
                ))
            }
        };
        if windows.is_empty() {
            return Err(config_error("scheduler.periods가 비어 있습니다"));
        }

        if config.interval_minutes == 0 {
            return Err(config_error("scheduler.interval_minutes는 1 이상이어야 합니다"));
        }
        if config.max_concurrent_fetches == 0 {
            return Err(config_error("scheduler.max_concurrent_fetches는 1 이상이어야 합니다"));
        }

        let daily_at = config
            .daily_at
            .as_deref()
            .map(parse_daily_at)
            .transpose()?;

        Ok(Self {
            symbols,
            windows,
            interval: Duration::from_secs(config.interval_minutes * 60),
            daily_at,
            max_concurrent_fetches: config.max_concurrent_fetches,
            run_on_start: config.run_on_start,
        })
    }

    /// 주어진 날짜 기준의 (심볼, 범위) 작업 목록.
    pub fn jobs(&self, today: NaiveDate) -> Vec<(ForexSymbol, DateRange)> {
        self.symbols
            .iter()
            .flat_map(|symbol| {
                self.windows
                    .iter()
                    .map(move |window| (symbol.clone(), window.resolve(today)))
            })
            .collect()
    }
}

fn parse_daily_at(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), DAILY_AT_FORMAT)
        .map_err(|_| config_error(&format!("scheduler.daily_at 형식 오류 (HH:MM): '{}'", raw)))
}

fn config_error(message: &str) -> CollectorError {
    CollectorError::Validation(ValidationError::Config(message.to_string()))
}

/// `--start`/`--end` 문자열을 범위로 변환합니다 (CLI용).
pub fn parse_range(start: &str, end: &str) -> Result<DateRange> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    Ok(DateRange::new(start, end)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_bad_schedule_only_fails_plan_validation() {
        let path = std::env::temp_dir().join(format!(
            "forex-collector-bad-schedule-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[server]\nport = 5100\n[scheduler]\ndaily_at = \"25:99\"\nperiods = [\"2Q\"]\n",
        )
        .unwrap();

        let app = load_app_config(Some(&path));
        let full = CollectorConfig::load(Some(&path));
        std::fs::remove_file(&path).ok();

        let app = app.unwrap();
        assert_eq!(app.server.port, 5100);
        assert_eq!(app.scheduler.daily_at.as_deref(), Some("25:99"));
        assert!(matches!(full, Err(CollectorError::Validation(_))));
    }

    #[test]
    fn test_default_plan_mirrors_collector_defaults() {
        let plan = SchedulePlan::from_config(&SchedulerConfig::default()).unwrap();

        assert_eq!(plan.symbols.len(), 2);
        assert_eq!(plan.windows.len(), 5);
        assert_eq!(plan.interval, Duration::from_secs(300));
        assert_eq!(plan.daily_at, NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(plan.max_concurrent_fetches, 5);
        assert_eq!(plan.jobs(date("2024-06-30")).len(), 10);
    }

    #[test]
    fn test_rolling_windows_resolve_against_today() {
        let plan = SchedulePlan::from_config(&SchedulerConfig {
            symbols: vec!["GBPINR=X".into()],
            periods: vec!["1W".into(), "1M".into()],
            ..Default::default()
        })
        .unwrap();

        let jobs = plan.jobs(date("2024-06-30"));
        assert_eq!(jobs[0].1, DateRange::parse("2024-06-23", "2024-06-30").unwrap());
        assert_eq!(jobs[1].1, DateRange::parse("2024-05-31", "2024-06-30").unwrap());
    }

    #[test]
    fn test_fixed_range_replaces_periods() {
        let plan = SchedulePlan::from_config(&SchedulerConfig {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(plan.windows.len(), 1);
        let jobs = plan.jobs(date("2030-01-01"));
        assert!(jobs
            .iter()
            .all(|(_, range)| range.start() == date("2024-01-01") && range.end() == date("2024-01-31")));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = vec![
            SchedulerConfig {
                symbols: vec!["BAD SYMBOL".into()],
                ..Default::default()
            },
            SchedulerConfig {
                symbols: vec![],
                ..Default::default()
            },
            SchedulerConfig {
                periods: vec!["2Q".into()],
                ..Default::default()
            },
            SchedulerConfig {
                interval_minutes: 0,
                ..Default::default()
            },
            SchedulerConfig {
                max_concurrent_fetches: 0,
                ..Default::default()
            },
            SchedulerConfig {
                daily_at: Some("25:00".into()),
                ..Default::default()
            },
            SchedulerConfig {
                start_date: Some("2024-01-01".into()),
                ..Default::default()
            },
            SchedulerConfig {
                start_date: Some("2024-02-01".into()),
                end_date: Some("2024-01-01".into()),
                ..Default::default()
            },
        ];

        for config in cases {
            assert!(
                matches!(SchedulePlan::from_config(&config), Err(CollectorError::Validation(_))),
                "{:?}",
                config
            );
        }
    }

    #[test]
    fn test_parse_range() {
        assert!(parse_range("2024-01-01", "2024-01-10").is_ok());
        assert!(parse_range("2024/01/01", "2024-01-10").is_err());
        assert!(parse_range("2024-01-10", "2024-01-01").is_err());
    }
}
