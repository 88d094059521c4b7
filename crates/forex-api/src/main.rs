//! Forex API 서버.
//!
//! 설정을 로드하고 저장소를 연 뒤, 설정에 따라 주기 수집 스케줄러를
//! 백그라운드로 띄우고 HTTP 요청을 처리합니다.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use forex_api::{create_router, request_timeout, AppState};
use forex_collector::{CollectorConfig, Scheduler};
use forex_core::init_logging;
use forex_data::{
    ForexDataManager, HistoricalRateProvider, PriceStore, RetryPolicy, RetryingProvider,
    YahooRateProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("FOREX_CONFIG").map(PathBuf::from);
    let config = CollectorConfig::load(config_path.as_deref()).context("설정 로드 실패")?;

    init_logging(&config.app.logging)
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting Forex API server...");

    let server = &config.app.server;
    let addr = server.socket_addr().map_err(|e| {
        error!(
            host = %server.host,
            port = server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. FOREX__SERVER__HOST, FOREX__SERVER__PORT를 확인하세요."
        );
        e
    })?;

    // 저장소 + Provider
    let store = PriceStore::connect(&config.app.database.url).await?;
    let yahoo: Arc<dyn HistoricalRateProvider> = Arc::new(YahooRateProvider::new()?);
    let policy = RetryPolicy::from(&config.app.fetcher);
    let manager = ForexDataManager::new(Arc::new(RetryingProvider::new(yahoo, policy)), store.clone());

    // 전역 종료 토큰 (스케줄러에 종료 전파)
    let shutdown_token = CancellationToken::new();

    let mut state = AppState::new(manager.clone());
    let scheduler_handle = if config.app.scheduler.enabled {
        let plan = config.plan.clone();
        state = state.with_scheduler(format!(
            "{} symbols x {} windows, every {} min",
            plan.symbols.len(),
            plan.windows.len(),
            plan.interval.as_secs() / 60
        ));
        Some(Scheduler::new(manager, plan).spawn(shutdown_token.clone()))
    } else {
        info!("스케줄러 비활성화");
        None
    };
    let state = Arc::new(state);

    info!(version = %state.version, provider = state.manager.provider_name(), "Application state initialized");

    let app = create_router(state, request_timeout(server, &policy));

    info!(%addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    if let Some(handle) = scheduler_handle {
        match tokio::time::timeout(Duration::from_secs(10), handle).await {
            Ok(Ok(())) => info!("Scheduler stopped"),
            Ok(Err(e)) => warn!(error = %e, "Scheduler task failed"),
            Err(_) => warn!("Scheduler stop timeout, forcing shutdown"),
        }
    }

    store.close().await;
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
