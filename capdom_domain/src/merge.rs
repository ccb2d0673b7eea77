use bigdecimal::{BigDecimal, Zero};

use crate::models::CoinSeries;
use crate::table::{TimeTable, MergeError};

/// Bitcoin and Ethereum side by side, with gaps left as missing cells.
pub fn merge_primary(bitcoin: CoinSeries, ethereum: CoinSeries) -> Result<TimeTable, MergeError> {
    TimeTable::from(bitcoin).outer_join(TimeTable::from(ethereum))
}

/// Folds every series into one table, zero-filling after each join so the
/// row sums count absent coins as no contribution.
///
/// No series yields an empty table without columns.
pub fn merge_zero_filled<I>(series: I) -> Result<TimeTable, MergeError>
where
    I: IntoIterator<Item = CoinSeries>,
{
    let zero = BigDecimal::zero();
    let mut merged: Option<TimeTable> = None;

    for next in series {
        let table = TimeTable::from(next);
        merged = Some(match merged {
            None => table,
            Some(acc) => {
                let mut joined = acc.outer_join(table)?;
                joined.fill_missing(&zero);
                joined
            }
        });
    }

    match merged {
        Some(table) => Ok(table),
        None => TimeTable::new(Vec::new()),
    }
}
