//! 인메모리 SQLite 환율 저장소.
//!
//! (symbol, date)를 기본 키로 하는 단일 테이블에 일별 레코드를 저장합니다.
//!
//! # 동작 방식
//!
//! 1. `PriceStore::in_memory()`가 연결 1개짜리 풀을 열고 테이블을 생성
//! 2. 연결은 유휴/수명 만료로 회수되지 않으므로 DB는 저장소 핸들과 수명이 같음
//! 3. 같은 (symbol, date)를 다시 저장하면 값을 덮어씀 (upsert)
//! 4. 프로세스 종료 시 모든 데이터가 사라짐
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! let store = PriceStore::in_memory().await?;
//! store.insert(&records).await?;
//! let rows = store.query(&symbol, Some(start), Some(end)).await?;
//! ```

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{debug, info, instrument};

use forex_core::{parse_date, ForexSymbol, PriceRecord};

use crate::error::{DataError, Result};

/// 인메모리 DB URL.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS price_records (
    symbol      TEXT    NOT NULL,
    date        TEXT    NOT NULL,
    open        TEXT    NOT NULL,
    high        TEXT    NOT NULL,
    low         TEXT    NOT NULL,
    close       TEXT    NOT NULL,
    adj_close   TEXT,
    volume      INTEGER NOT NULL DEFAULT 0,
    fetched_at  TEXT    NOT NULL,
    PRIMARY KEY (symbol, date)
)
"#;

/// 환율 레코드 DB 행.
///
/// SQLite에는 decimal 타입이 없으므로 가격은 문자열로 저장합니다.
#[derive(Debug, Clone, FromRow)]
struct PriceRow {
    symbol: String,
    date: NaiveDate,
    open: String,
    high: String,
    low: String,
    close: String,
    adj_close: Option<String>,
    volume: i64,
}

impl TryFrom<PriceRow> for PriceRecord {
    type Error = DataError;

    fn try_from(row: PriceRow) -> Result<Self> {
        let symbol = ForexSymbol::parse(&row.symbol)?;
        let record = PriceRecord {
            symbol,
            date: row.date,
            open: decimal(&row.open)?,
            high: decimal(&row.high)?,
            low: decimal(&row.low)?,
            close: decimal(&row.close)?,
            adj_close: row.adj_close.as_deref().map(decimal).transpose()?,
            volume: row.volume,
        };
        Ok(record)
    }
}

fn decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| DataError::Database(format!("가격 파싱 실패 '{}': {}", raw, e)))
}

#[derive(Debug, Clone, FromRow)]
struct SummaryRow {
    symbol: String,
    first_date: String,
    last_date: String,
    records: i64,
    last_fetched_at: Option<String>,
}

/// 심볼별 저장 현황.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolSummary {
    pub symbol: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub records: i64,
    /// 마지막 저장 시각 (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fetched_at: Option<String>,
}

impl TryFrom<SummaryRow> for SymbolSummary {
    type Error = DataError;

    fn try_from(row: SummaryRow) -> Result<Self> {
        Ok(Self {
            symbol: row.symbol,
            first_date: parse_date(&row.first_date)?,
            last_date: parse_date(&row.last_date)?,
            records: row.records,
            last_fetched_at: row.last_fetched_at,
        })
    }
}

/// 프로세스 수명 동안 유지되는 환율 저장소.
///
/// 복제 비용이 작은 핸들이며, 모든 복제본이 같은 DB를 공유합니다.
#[derive(Debug, Clone)]
pub struct PriceStore {
    pool: SqlitePool,
}

impl PriceStore {
    /// 새 인메모리 저장소를 생성합니다.
    pub async fn in_memory() -> Result<Self> {
        Self::connect(IN_MEMORY_URL).await
    }

    /// 주어진 SQLite URL로 저장소를 엽니다.
    ///
    /// 쓰기는 한 번에 하나만 수행되도록 연결은 1개로 고정합니다.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DataError::Connection(format!("잘못된 DB URL '{}': {}", url, e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DataError::Connection(e.to_string()))?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        info!(url = url, "환율 저장소 초기화 완료");
        Ok(Self { pool })
    }

    /// 레코드를 저장합니다 (symbol+date 기준 upsert).
    ///
    /// 한 트랜잭션으로 처리하며 저장된 행 수를 반환합니다.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn insert(&self, records: &[PriceRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let fetched_at = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO price_records
                    (symbol, date, open, high, low, close, adj_close, volume, fetched_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (symbol, date) DO UPDATE SET
                    open = excluded.open,
                    high = excluded.high,
                    low = excluded.low,
                    close = excluded.close,
                    adj_close = excluded.adj_close,
                    volume = excluded.volume,
                    fetched_at = excluded.fetched_at
                "#,
            )
            .bind(record.symbol.as_str())
            .bind(record.date)
            .bind(record.open.to_string())
            .bind(record.high.to_string())
            .bind(record.low.to_string())
            .bind(record.close.to_string())
            .bind(record.adj_close.map(|d| d.to_string()))
            .bind(record.volume)
            .bind(fetched_at.as_str())
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected() as usize;
        }

        tx.commit().await?;

        debug!(written = written, "환율 레코드 저장");
        Ok(written)
    }

    /// 심볼의 레코드를 날짜 오름차순으로 조회합니다.
    ///
    /// `start`/`end`는 포함 경계이며, 해당하는 행이 없으면 빈 벡터를 반환합니다.
    #[instrument(skip(self))]
    pub async fn query(
        &self,
        symbol: &ForexSymbol,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceRecord>> {
        let rows: Vec<PriceRow> = sqlx::query_as(
            r#"
            SELECT symbol, date, open, high, low, close, adj_close, volume
            FROM price_records
            WHERE symbol = ?
              AND (? IS NULL OR date >= ?)
              AND (? IS NULL OR date <= ?)
            ORDER BY date ASC
            "#,
        )
        .bind(symbol.as_str())
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PriceRecord::try_from).collect()
    }

    /// 저장된 심볼별 현황.
    pub async fn summaries(&self) -> Result<Vec<SymbolSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT symbol,
                   MIN(date) AS first_date,
                   MAX(date) AS last_date,
                   COUNT(*) AS records,
                   MAX(fetched_at) AS last_fetched_at
            FROM price_records
            GROUP BY symbol
            ORDER BY symbol
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SymbolSummary::try_from).collect()
    }

    /// 전체 레코드 수.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM price_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// 연결 상태 확인.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// 연결을 닫습니다. 인메모리 DB는 이 시점에 사라집니다.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
