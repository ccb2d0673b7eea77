//! Total market cap and Bitcoin/altcoin dominance.
//!
//! A zero or missing total makes dominance undefined. Such rows get no
//! dominance values and are later dropped as incomplete.

use bigdecimal::{BigDecimal, Zero};

use crate::ext::bigdecimal::{RoundExt, RoundingMode};
use crate::models::{CoinId, DominanceMode, MergedRow, MergedTable};
use crate::schema::Column;
use crate::table::{TimeTable, MergeError};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DominancePrecision {
    pub digits: i64,
    pub mode: RoundingMode,
}

impl Default for DominancePrecision {
    fn default() -> Self {
        DominancePrecision { digits: 8, mode: RoundingMode::HalfUp }
    }
}

/// Row sums of a zero-filled table, as a single `Total Market Cap` column.
pub fn total_market_cap(zero_filled: TimeTable) -> Result<TimeTable, MergeError> {
    let total = Column::TotalMarketCap.header();
    zero_filled
        .with_row_sum(total)?
        .project(&[total])
}

/// `(bitcoin, altcoin)` dominance in percent; `None` when `total` is zero.
pub fn dominance(
    bitcoin: &BigDecimal,
    total: &BigDecimal,
    precision: DominancePrecision,
) -> Option<(BigDecimal, BigDecimal)> {
    if total.is_zero() {
        return None;
    }

    let raw = (bitcoin.clone() * BigDecimal::from(100)) / total.clone();
    let dom = raw.with_rounding(precision.digits, precision.mode);
    let altdom = DominanceMode::complement(&dom);
    Some((dom, altdom))
}

/// Joins totals computed from `zero_filled` onto `primary` and derives dominance per row.
pub fn derive(
    primary: TimeTable,
    zero_filled: TimeTable,
    bitcoin: &CoinId,
    ethereum: &CoinId,
    precision: DominancePrecision,
) -> Result<MergedTable, MergeError> {
    let bitcoin_column = bitcoin.market_cap_column();
    let ethereum_column = ethereum.market_cap_column();
    let total_column = Column::TotalMarketCap.header();

    for column in &[&bitcoin_column, &ethereum_column] {
        if primary.column_index(column).is_none() {
            return Err(MergeError::UnknownColumn { column: (*column).clone() });
        }
    }

    let joined = primary.outer_join(total_market_cap(zero_filled)?)?;

    let rows = joined.timestamps()
        .map(|ts| {
            let bitcoin_market_cap = joined.get(ts, &bitcoin_column).cloned();
            let total_market_cap = joined.get(ts, total_column).cloned();

            let pair = match (&bitcoin_market_cap, &total_market_cap) {
                (Some(b), Some(t)) => dominance(b, t, precision),
                _ => None,
            };
            let (bitcoin_dominance, altcoin_dominance) = match pair {
                Some((dom, altdom)) => (Some(dom), Some(altdom)),
                None => (None, None),
            };

            MergedRow {
                timestamp: *ts,
                bitcoin_market_cap,
                ethereum_market_cap: joined.get(ts, &ethereum_column).cloned(),
                total_market_cap,
                bitcoin_dominance,
                altcoin_dominance,
            }
        })
        .collect();

    Ok(MergedTable::new(rows))
}
