//! 설정 관리.
//!
//! 기본값 → TOML 파일 → 환경 변수(`FOREX__SECTION__KEY`) 순으로 덮어씁니다.
//! 시작 시 한 번만 로드하며, 스케줄러 설정의 의미 검증은
//! `forex-collector`의 `SchedulePlan::from_config`에서 수행합니다.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 환경 변수 접두사.
pub const ENV_PREFIX: &str = "FOREX";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 외부 데이터 수집 설정
    pub fetcher: FetcherConfig,
    /// 주기 수집 설정
    pub scheduler: SchedulerConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            request_timeout_secs: 60,
        }
    }
}

impl ServerConfig {
    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite 연결 URL (기본: 인메모리)
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
        }
    }
}

/// 외부 데이터 수집 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// 요청 1회당 타임아웃 (초)
    pub timeout_secs: u64,
    /// 최대 시도 횟수 (1이면 재시도 없음)
    pub max_attempts: u32,
    /// 재시도 기본 대기 시간 (밀리초, 시도마다 2배)
    pub retry_base_delay_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 3,
            retry_base_delay_ms: 500,
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// 주기 수집 설정 (검증 전 원시 값).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// 스케줄러 활성화 여부
    pub enabled: bool,
    /// 수집 주기 (분)
    pub interval_minutes: u64,
    /// 수집할 심볼 목록 (예: "GBPINR=X")
    pub symbols: Vec<String>,
    /// 오늘 기준 수집 기간 목록 (예: "1W", "1M")
    pub periods: Vec<String>,
    /// 고정 수집 시작일 (YYYY-MM-DD, end_date와 함께 사용)
    pub start_date: Option<String>,
    /// 고정 수집 종료일 (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// 매일 추가 실행 시각 (UTC, HH:MM)
    pub daily_at: Option<String>,
    /// 틱당 동시 수집 작업 수
    pub max_concurrent_fetches: usize,
    /// 시작 직후 즉시 실행 여부
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: 5,
            symbols: vec!["GBPINR=X".to_string(), "AEDINR=X".to_string()],
            periods: ["1W", "1M", "3M", "6M", "1Y"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            start_date: None,
            end_date: None,
            daily_at: Some("00:00".to_string()),
            max_concurrent_fetches: 5,
            run_on_start: true,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 파일명과 줄 번호 출력 여부
    pub with_file: bool,
    /// 대상(모듈 경로) 출력 여부
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            with_file: false,
            with_target: true,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `path`가 주어지면 해당 파일이 반드시 있어야 하고,
    /// 없으면 기본 경로를 선택적으로 읽습니다.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("scheduler.symbols")
                    .with_list_parse_key("scheduler.periods"),
            );

        builder.build()?.try_deserialize()
    }
}
