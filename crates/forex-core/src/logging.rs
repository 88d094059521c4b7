//! tracing 구독자 초기화.
//!
//! `logging` 설정 섹션을 따라 `EnvFilter`와 fmt 레이어 하나를 설치합니다.
//! 출력 형식은 `pretty`, `json`, `compact` 중 하나이며 `LOG_FORMAT` 환경
//! 변수가 설정 파일보다 우선합니다. `RUST_LOG`는 `level`보다 우선합니다.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 여러 줄 형식 (개발용)
    #[default]
    Pretty,
    /// 로그 수집기용 JSON 형식
    Json,
    /// 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// 환경 변수 값, 설정 값, 기본값 순으로 형식을 정합니다.
    ///
    /// 알 수 없는 값은 건너뜁니다.
    pub fn select(env: Option<&str>, configured: &str) -> Self {
        env.and_then(|s| s.parse().ok())
            .or_else(|| configured.parse().ok())
            .unwrap_or_default()
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer(config: &LoggingConfig, format: LogFormat) -> BoxedLayer {
    let layer = fmt::layer()
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_target(config.with_target);

    match format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// `logging` 설정으로 전역 구독자를 설치합니다.
///
/// # 예제
///
/// ```no_run
/// use forex_core::{init_logging, LoggingConfig};
///
/// let config = LoggingConfig {
///     level: "forex_data=debug,info".to_string(),
///     ..LoggingConfig::default()
/// };
/// init_logging(&config).unwrap();
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let format = LogFormat::select(std::env::var("LOG_FORMAT").ok().as_deref(), &config.format);

    tracing_subscriber::registry()
        .with(fmt_layer(config, format))
        .with(env_filter)
        .try_init()?;

    tracing::info!(format = ?format, level = %config.level, "Logging initialized");
    Ok(())
}
