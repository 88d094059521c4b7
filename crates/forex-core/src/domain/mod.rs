//! 환율 데이터 도메인 모델.

mod price_record;

pub use price_record::*;
