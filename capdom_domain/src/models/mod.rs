mod coin_id;
pub use coin_id::CoinId;

mod market_cap;
pub use market_cap::{MarketCapSample, CoinSeries};

mod dominance_mode;
pub use dominance_mode::DominanceMode;

mod merged_table;
pub use merged_table::{MergedRow, MergedTable};

mod history;
pub use history::{MarketCapRow, MarketCapHistory};

mod date_range;
pub use date_range::{DateRange, DateRangeParseError};

pub mod coins {
    pub use super::coin_id::defaults::*;
}
