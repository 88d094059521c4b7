//! 환율 레코드 저장소.
//!
//! - `price_store`: 인메모리 SQLite 기반 저장소 (symbol+date upsert)

pub mod price_store;

pub use price_store::{PriceStore, SymbolSummary, IN_MEMORY_URL};
