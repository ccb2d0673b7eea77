use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use snafu::Snafu;

use crate::models::CoinSeries;

#[derive(Snafu, Debug, PartialEq)]
pub enum MergeError {
    #[snafu(display("Column '{}' appears on both sides of the join", column))]
    DuplicateColumn {
        column: String,
    },

    #[snafu(display("Column '{}' does not exist in table", column))]
    UnknownColumn {
        column: String,
    },
}

/// Decimal columns keyed by a unique, ascending timestamp.
///
/// A `None` cell means the source had no value for that instant.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeTable {
    columns: Vec<String>,
    rows: BTreeMap<DateTime<Utc>, Vec<Option<BigDecimal>>>,
}

impl TimeTable {
    pub fn new(columns: Vec<String>) -> Result<TimeTable, MergeError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return DuplicateColumn { column: column.clone() }.fail();
            }
        }

        Ok(TimeTable { columns, rows: BTreeMap::new() })
    }

    /// A later sample at an already seen timestamp replaces the earlier one.
    pub fn from_series(series: CoinSeries) -> TimeTable {
        let columns = vec![series.column_name()];
        let rows = series.into_samples().into_iter()
            .map(|s| (s.timestamp, vec![Some(s.market_cap_usd)]))
            .collect();

        TimeTable { columns, rows }
    }

    pub fn columns(&self) -> &[String] { &self.columns }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.rows.keys()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&DateTime<Utc>, &[Option<BigDecimal>])> {
        self.rows.iter().map(|(ts, values)| (ts, values.as_slice()))
    }

    /// `None` both for absent rows and for missing cells.
    pub fn get(&self, timestamp: &DateTime<Utc>, column: &str) -> Option<&BigDecimal> {
        let index = self.column_index(column)?;
        self.rows.get(timestamp)
            .and_then(|values| values[index].as_ref())
    }

    /// Full outer join on the timestamp. Cells of the side lacking a timestamp are `None`.
    pub fn outer_join(self, other: TimeTable) -> Result<TimeTable, MergeError> {
        if let Some(column) = other.columns.iter().find(|c| self.columns.contains(c)) {
            return DuplicateColumn { column: column.clone() }.fail();
        }

        let left_width = self.columns.len();
        let width = left_width + other.columns.len();

        let mut columns = self.columns;
        columns.extend(other.columns);

        let mut right_rows = other.rows;
        let mut rows = BTreeMap::new();

        for (timestamp, mut values) in self.rows {
            match right_rows.remove(&timestamp) {
                Some(right) => values.extend(right),
                None => values.resize(width, None),
            }
            rows.insert(timestamp, values);
        }

        for (timestamp, right) in right_rows {
            let mut values = vec![None; left_width];
            values.extend(right);
            rows.insert(timestamp, values);
        }

        Ok(TimeTable { columns, rows })
    }

    pub fn fill_missing(&mut self, value: &BigDecimal) {
        for cell in self.rows.values_mut().flat_map(|values| values.iter_mut()) {
            if cell.is_none() {
                *cell = Some(value.clone());
            }
        }
    }

    /// Appends `column` holding the sum of every existing column; missing cells count as zero.
    pub fn with_row_sum(mut self, column: &str) -> Result<TimeTable, MergeError> {
        if self.column_index(column).is_some() {
            return DuplicateColumn { column: column.to_owned() }.fail();
        }

        for values in self.rows.values_mut() {
            let mut sum = BigDecimal::zero();
            for value in values.iter().flatten() {
                sum = sum + value;
            }
            values.push(Some(sum));
        }

        self.columns.push(column.to_owned());
        Ok(self)
    }

    /// Keeps the named columns, in the given order, for every row.
    pub fn project(&self, columns: &[&str]) -> Result<TimeTable, MergeError> {
        let mut indices = Vec::with_capacity(columns.len());
        for column in columns {
            let index = self.column_index(column)
                .ok_or_else(|| MergeError::UnknownColumn { column: (*column).to_owned() })?;
            indices.push(index);
        }

        let mut table = TimeTable::new(columns.iter().map(|c| (*c).to_owned()).collect())?;
        for (timestamp, values) in &self.rows {
            let projected = indices.iter().map(|&i| values[i].clone()).collect();
            table.rows.insert(*timestamp, projected);
        }

        Ok(table)
    }
}

impl From<CoinSeries> for TimeTable {
    fn from(series: CoinSeries) -> Self {
        TimeTable::from_series(series)
    }
}
