// Position sizing under hard safety limits
pub mod sizing;

pub use sizing::{trade_levels, SizedTrade, SizingConfig};
