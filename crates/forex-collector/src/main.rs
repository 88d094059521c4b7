//! Standalone forex collector CLI.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use forex_collector::config::{load_app_config, parse_range};
use forex_collector::{fetch_once, SchedulePlan, Scheduler};
use forex_core::{init_logging, ForexSymbol, Period};
use forex_data::{
    ForexDataManager, HistoricalRateProvider, PriceStore, RetryPolicy, RetryingProvider,
    YahooRateProvider,
};

#[derive(Parser)]
#[command(name = "forex-collector")]
#[command(about = "Forex rate collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 설정 파일 경로 (기본: FOREX_CONFIG 또는 config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// 한 심볼을 조회해 저장한 뒤 저장소에서 다시 읽어 출력
    Fetch {
        /// 심볼 (예: "EURUSD=X")
        #[arg(long)]
        symbol: String,

        /// 시작일 (YYYY-MM-DD)
        #[arg(long, requires = "end", conflicts_with = "period")]
        start: Option<String>,

        /// 종료일 (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// 오늘 기준 기간 (예: "1W", "3M", "1Y")
        #[arg(long, required_unless_present = "start")]
        period: Option<String>,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 데몬 모드: 설정된 스케줄로 주기 수집
    Daemon,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os("FOREX_CONFIG").map(PathBuf::from));
    let config = load_app_config(config_path.as_deref()).context("설정 로드 실패")?;

    // 로깅 초기화
    let mut logging = config.logging.clone();
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    init_logging(&logging).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    tracing::info!("Forex Collector 시작");

    let store = PriceStore::connect(&config.database.url).await?;
    let yahoo: Arc<dyn HistoricalRateProvider> = Arc::new(YahooRateProvider::new()?);
    let provider = Arc::new(RetryingProvider::new(
        yahoo,
        RetryPolicy::from(&config.fetcher),
    ));
    let manager = ForexDataManager::new(provider, store.clone());

    match cli.command {
        Commands::Fetch {
            symbol,
            start,
            end,
            period,
            json,
        } => {
            let symbol = ForexSymbol::parse(&symbol)?;
            let range = match (start, end, period) {
                (Some(start), Some(end), _) => parse_range(&start, &end)?,
                (_, _, Some(period)) => period
                    .parse::<Period>()?
                    .window_ending(Utc::now().date_naive()),
                _ => anyhow::bail!("--start/--end 또는 --period가 필요합니다"),
            };

            let report = fetch_once(&manager, &symbol, range).await?;

            let mut stdout = std::io::stdout().lock();
            if json {
                report.write_json(&mut stdout)?;
            } else {
                report.write_table(&mut stdout)?;
            }
        }
        Commands::Daemon => {
            // 스케줄 계획은 데몬 모드에서만 검증
            let plan = SchedulePlan::from_config(&config.scheduler).context("스케줄 설정 오류")?;
            let shutdown = CancellationToken::new();
            let signal_token = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("종료 신호 수신, 데몬 종료 중...");
                }
                signal_token.cancel();
            });

            Scheduler::new(manager, plan).run(shutdown).await;
        }
    }

    store.close().await;
    tracing::info!("Forex Collector 종료");

    Ok(())
}
