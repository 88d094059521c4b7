//! 환율 API 라우트 통합 테스트.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use forex_api::{create_api_router, create_router, request_timeout, AppState};
use forex_core::{AppConfig, DateRange, ForexSymbol, PriceRecord};
use forex_data::{
    DataError, ForexDataManager, HistoricalRateProvider, PriceStore, Result, RetryPolicy,
    RetryingProvider,
};

/// 평일마다 레코드를 돌려주는 가짜 Provider.
///
/// `NODATA=X`는 데이터 없음, `DOWN=X`는 조회 실패, `NOPE=X`는 알 수 없는
/// 심볼을 흉내냅니다.
struct WeekdayProvider;

#[async_trait]
impl HistoricalRateProvider for WeekdayProvider {
    fn name(&self) -> &str {
        "weekday"
    }

    async fn fetch(&self, symbol: &ForexSymbol, range: DateRange) -> Result<Vec<PriceRecord>> {
        match symbol.as_str() {
            "NODATA=X" => {
                return Err(DataError::NoData {
                    symbol: symbol.to_string(),
                    range: range.to_string(),
                })
            }
            "DOWN=X" => return Err(DataError::Fetch("upstream unavailable".into())),
            "NOPE=X" => return Err(DataError::SymbolNotFound(symbol.to_string())),
            _ => {}
        }

        use chrono::Datelike;
        Ok(range
            .start()
            .iter_days()
            .take_while(|d| *d <= range.end())
            .filter(|d| d.weekday().number_from_monday() <= 5)
            .map(|d| {
                PriceRecord::new(symbol.clone(), d, dec!(1.1038), dec!(1.1045), dec!(1.0950), dec!(1.0939))
                    .with_adj_close(dec!(1.0939))
            })
            .collect())
    }
}

async fn app() -> (Router, ForexDataManager) {
    let store = PriceStore::in_memory().await.unwrap();
    let manager = ForexDataManager::new(Arc::new(WeekdayProvider), store);
    let state = Arc::new(AppState::new(manager.clone()));
    (create_api_router().with_state(state), manager)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn seed(manager: &ForexDataManager, symbol: &str, start: &str, end: &str) -> usize {
    manager
        .fetch_and_store(
            &ForexSymbol::parse(symbol).unwrap(),
            DateRange::parse(start, end).unwrap(),
        )
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn get_forex_returns_stored_records() {
    let (app, manager) = app().await;
    let trading_days = seed(&manager, "EURUSD=X", "2024-01-01", "2024-01-10").await;
    assert_eq!(trading_days, 8);

    let (status, body) = send(&app, get("/forex?symbol=EURUSD=X&start=2024-01-01&end=2024-01-10")).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), trading_days);
    for key in ["symbol", "date", "open", "high", "low", "close"] {
        assert!(rows[0].get(key).is_some(), "missing {}", key);
    }
    assert_eq!(rows[0]["symbol"], "EURUSD=X");
    assert_eq!(rows[0]["date"], "2024-01-01");
    assert_eq!(rows[0]["open"], "1.1038");
    assert_eq!(rows[7]["date"], "2024-01-10");
}

#[tokio::test]
async fn versioned_path_serves_same_handler() {
    let (app, manager) = app().await;
    seed(&manager, "GBPINR=X", "2024-03-01", "2024-03-31").await;

    let (status, body) = send(&app, get("/api/v1/forex?symbol=gbpinr%3Dx&start=2024-03-10&end=2024-03-16")).await;

    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-03-11", "2024-03-12", "2024-03-13", "2024-03-14", "2024-03-15"]);
}

#[tokio::test]
async fn missing_symbol_is_bad_request() {
    let (app, _) = app().await;

    let (status, body) = send(&app, get("/forex?start=2024-01-01&end=2024-01-10")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_SYMBOL");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn malformed_inputs_are_bad_request() {
    let (app, _) = app().await;

    let cases = [
        ("/forex?symbol=EUR%20USD", "INVALID_SYMBOL"),
        ("/forex?symbol=EURUSD=X&start=01-01-2024", "INVALID_START_DATE"),
        ("/forex?symbol=EURUSD=X&end=2024-13-01", "INVALID_END_DATE"),
        ("/forex?symbol=EURUSD=X&start=2024-02-01&end=2024-01-01", "INVALID_DATE_RANGE"),
    ];

    for (uri, code) in cases {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], code, "{}", uri);
    }
}

#[tokio::test]
async fn unknown_symbol_is_empty_array() {
    let (app, manager) = app().await;
    seed(&manager, "EURUSD=X", "2024-01-01", "2024-01-10").await;

    let (status, body) = send(&app, get("/forex?symbol=USDJPY=X")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));
}

#[tokio::test]
async fn fetch_endpoint_stores_and_returns_records() {
    let (app, _) = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/forex/fetch",
            serde_json::json!({
                "symbol": "AEDINR=X",
                "start_date": "2024-01-01",
                "end_date": "2024-01-07"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "AEDINR=X");
    assert_eq!(body["fetched_count"], 5);
    assert_eq!(body["records"].as_array().unwrap().len(), 5);
    assert_eq!(body["records"][0]["adj_close"], "1.0939");

    let (status, stored) = send(&app, get("/forex?symbol=AEDINR=X")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored.as_array().unwrap().len(), 5);

    let (status, symbols) = send(&app, get("/api/v1/forex/symbols")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(symbols["total"], 1);
    assert_eq!(symbols["symbols"][0]["symbol"], "AEDINR=X");
    assert_eq!(symbols["symbols"][0]["records"], 5);
}

#[tokio::test]
async fn fetch_endpoint_maps_provider_errors() {
    let (app, _) = app().await;
    let body = |symbol: &str| {
        serde_json::json!({
            "symbol": symbol,
            "start_date": "2024-01-01",
            "end_date": "2024-01-07"
        })
    };

    let (status, err) = send(&app, post_json("/api/v1/forex/fetch", body("NODATA=X"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NO_DATA");

    let (status, err) = send(&app, post_json("/api/v1/forex/fetch", body("DOWN=X"))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(err["code"], "FETCH_ERROR");

    let (status, err) = send(&app, post_json("/api/v1/forex/fetch", body("NOPE=X"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "SYMBOL_NOT_FOUND");
}

/// 응답하지 않는 Provider.
struct HangingProvider;

#[async_trait]
impl HistoricalRateProvider for HangingProvider {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn fetch(&self, _symbol: &ForexSymbol, _range: DateRange) -> Result<Vec<PriceRecord>> {
        std::future::pending::<Result<Vec<PriceRecord>>>().await
    }
}

#[tokio::test]
async fn fetch_timeout_reaches_client_as_gateway_timeout() {
    let config = AppConfig::default();
    let policy = RetryPolicy::from(&config.fetcher);
    let provider = RetryingProvider::new(Arc::new(HangingProvider), policy);
    let store = PriceStore::in_memory().await.unwrap();
    let state = Arc::new(AppState::new(ForexDataManager::new(Arc::new(provider), store)));
    let app = create_router(state, request_timeout(&config.server, &policy));

    // 저장소를 연 뒤 시간을 멈추고, 기본 설정의 재시도 전체를 자동 진행
    tokio::time::pause();
    let started = tokio::time::Instant::now();

    let (status, err) = send(
        &app,
        post_json(
            "/api/v1/forex/fetch",
            serde_json::json!({
                "symbol": "EURUSD=X",
                "start_date": "2024-01-01",
                "end_date": "2024-01-07"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(err["code"], "FETCH_TIMEOUT");
    assert!(started.elapsed() >= policy.timeout * policy.max_attempts);
}

#[tokio::test]
async fn fetch_endpoint_rejects_bad_body() {
    let (app, _) = app().await;

    let (status, err) = send(
        &app,
        post_json("/api/v1/forex/fetch", serde_json::json!({ "symbol": "EURUSD=X" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_REQUEST_BODY");

    let (status, err) = send(
        &app,
        post_json(
            "/api/v1/forex/fetch",
            serde_json::json!({
                "symbol": "EURUSD=X",
                "start_date": "2024-01-10",
                "end_date": "2024-01-01"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_DATE_RANGE");
}

#[tokio::test]
async fn fetch_period_builds_pair_symbol() {
    let (app, _) = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/forex/fetch-period",
            serde_json::json!({ "from": "gbp", "to": "inr", "period": "1W" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "GBPINR=X");
    // 8일 창에는 평일이 최소 5일
    assert!(body["fetched_count"].as_u64().unwrap() >= 5);

    let (status, err) = send(
        &app,
        post_json(
            "/api/v1/forex/fetch-period",
            serde_json::json!({ "from": "GBP", "to": "INR", "period": "2Q" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_PERIOD");

    let (status, err) = send(
        &app,
        post_json(
            "/api/v1/forex/fetch-period",
            serde_json::json!({ "from": "POUND", "to": "INR", "period": "1M" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_CURRENCY");
}

#[tokio::test]
async fn health_endpoints() {
    let (app, _) = app().await;

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&app, get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["scheduler"]["status"], "not_configured");
}
