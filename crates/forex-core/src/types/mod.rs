//! 시스템 전반에서 사용되는 공통 타입.

mod date_range;
mod period;
mod symbol;

pub use date_range::*;
pub use period::*;
pub use symbol::*;
