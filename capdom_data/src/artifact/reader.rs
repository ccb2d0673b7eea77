use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use snafu::ResultExt;

use capdom_domain::models::{MarketCapHistory, MarketCapRow, MergedRow};
use capdom_domain::schema::{Column, SchemaVersion};

use super::{ArtifactError, Violation, Io, Csv, SchemaViolation, InvalidValue};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// RFC 3339, or a zone-less date time taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }

    NAIVE_FORMATS.iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

struct Layout {
    indices: Vec<(Column, usize)>,
}

impl Layout {
    fn cell<'r>(&self, record: &'r csv::StringRecord, column: Column) -> Option<&'r str> {
        let (_, idx) = self.indices.iter().find(|(c, _)| *c == column)?;
        record.get(*idx)
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"))
    }
}

/// Loads the artifact at `path` the way the dashboard consumes it.
///
/// Every schema column must be present in the header; other columns are
/// ignored, except an explicit `Market Cap Excl Bitcoin`. Rows missing a
/// value for one of the schema's mandatory columns are dropped. An absent
/// altcoin dominance is derived from bitcoin dominance.
pub fn read_artifact(path: &Path) -> Result<MarketCapHistory, ArtifactError> {
    let schema = SchemaVersion::CURRENT;
    let file = File::open(path).context(Io { path })?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers().context(Csv { path })?.clone();

    let missing = schema.missing_columns(headers.iter());
    if !missing.is_empty() {
        return SchemaViolation { path, schema, violation: Violation::MissingColumns(missing) }.fail();
    }

    let find = |column: Column| headers.iter()
        .position(|h| h.trim() == column.header())
        .map(|idx| (column, idx));

    let layout = Layout {
        indices: schema.columns().iter().copied()
            .chain(std::iter::once(Column::MarketCapExclBitcoin))
            .filter_map(find)
            .collect(),
    };

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record.context(Csv { path })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let decimal = |column: Column| -> Result<Option<BigDecimal>, ArtifactError> {
            match layout.cell(&record, column) {
                None => Ok(None),
                Some(raw) => BigDecimal::from_str(raw)
                    .map(Some)
                    .map_err(|_| ArtifactError::InvalidValue {
                        path: path.to_path_buf(),
                        column,
                        line,
                        value: raw.to_owned(),
                    }),
            }
        };

        let timestamp = match layout.cell(&record, Column::Timestamp) {
            None => None,
            Some(raw) => match parse_timestamp(raw) {
                Some(ts) => Some(ts),
                None => return InvalidValue { path, column: Column::Timestamp, line, value: raw }.fail(),
            },
        };

        let bitcoin_market_cap = decimal(Column::BitcoinMarketCap)?;
        let ethereum_market_cap = decimal(Column::EthereumMarketCap)?;
        let total_market_cap = decimal(Column::TotalMarketCap)?;
        let bitcoin_dominance = decimal(Column::BitcoinDominance)?;
        let altcoin_dominance = decimal(Column::AltcoinDominance)?;
        let reported_excl_bitcoin = decimal(Column::MarketCapExclBitcoin)?;

        let complete = timestamp.and_then(|timestamp| MergedRow {
            timestamp,
            bitcoin_market_cap,
            ethereum_market_cap,
            total_market_cap,
            bitcoin_dominance,
            altcoin_dominance,
        }.into_complete());

        match complete {
            Some(row) => rows.push(MarketCapRow { reported_excl_bitcoin, ..row }),
            None => {
                debug!("Dropping incomplete row at line {} of '{}'", line, path.display());
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!("Dropped {} incomplete rows from '{}'", dropped, path.display());
    }

    if rows.is_empty() {
        return SchemaViolation { path, schema, violation: Violation::Empty }.fail();
    }

    Ok(MarketCapHistory::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use chrono::{Duration, TimeZone};
    use capdom_domain::models::{DateRange, DominanceMode};
    use crate::artifact::write_artifact;

    fn decimal(x: impl AsRef<str>) -> BigDecimal {
        BigDecimal::from_str(x.as_ref()).unwrap()
    }

    fn row(day: i64, bitcoin: &str, total: &str, dom: &str) -> MarketCapRow {
        let dom = decimal(dom);
        MarketCapRow {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
            bitcoin_market_cap: decimal(bitcoin),
            ethereum_market_cap: decimal("200.25"),
            total_market_cap: decimal(total),
            altcoin_dominance: DominanceMode::complement(&dom),
            bitcoin_dominance: dom,
            reported_excl_bitcoin: None,
        }
    }

    fn write(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
        let path = dir.path().join("history.csv");
        fs::write(&path, text).unwrap();
        path
    }

    const HEADER: &str = "Timestamp,Bitcoin Market Cap,Ethereum Market Cap,Total Market Cap,Bitcoin Dominance (%),Altcoin Dominance (%)";

    #[test]
    fn reads_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let history = MarketCapHistory::from_rows(vec![
            row(0, "812345678901.123456789", "1634567890123.987", "49.69838917"),
            row(1, "500", "1000", "50.00000000"),
        ]);

        write_artifact(&path, &history).unwrap();
        let read = read_artifact(&path).unwrap();

        assert_eq!(read, history);
        assert_eq!(*read.latest().unwrap().market_cap_excl_bitcoin(), decimal("500"));
    }

    #[test]
    fn missing_columns_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "Timestamp,Bitcoin Market Cap,Total Market Cap\n2024-01-01T00:00:00Z,1,2\n");

        let err = read_artifact(&path).unwrap_err();

        assert_eq!(err.violation(), Some(&Violation::MissingColumns(vec![
            Column::EthereumMarketCap,
            Column::BitcoinDominance,
            Column::AltcoinDominance,
        ])));
    }

    #[test]
    fn incomplete_rows_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!("{}\n{}\n{}\n{}\n",
            HEADER,
            "2024-01-01T00:00:00.000Z,600,200,1000,60,40",
            "2024-01-02T00:00:00.000Z,,200,1000,60,40",
            "2024-01-03T00:00:00.000Z,610,200,1000,NaN,");
        let path = write(&dir, &text);

        let history = read_artifact(&path).unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history.first().unwrap().bitcoin_market_cap, decimal("600"));
    }

    #[test]
    fn only_mandatory_blanks_drop_a_row() {
        let schema = SchemaVersion::CURRENT;
        let values = ["2024-01-01T00:00:00.000Z", "600", "200", "1000", "60", "40"];

        for (idx, column) in schema.columns().iter().enumerate() {
            let dir = tempfile::tempdir().unwrap();
            let mut cells = values.to_vec();
            cells[idx] = "";
            let text = format!("{}\n{}\n", schema.headers().join(","), cells.join(","));
            let path = write(&dir, &text);

            match read_artifact(&path) {
                Ok(history) => {
                    assert!(!column.is_mandatory(), "{} accepted blank", column);
                    assert_eq!(history.len(), 1);
                }
                Err(err) => {
                    assert!(column.is_mandatory(), "{} rejected blank", column);
                    assert_eq!(err.violation(), Some(&Violation::Empty));
                }
            }
        }
    }

    #[test]
    fn only_incomplete_rows_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!("{}\n{}\n", HEADER, "2024-01-01T00:00:00.000Z,600,,1000,60,40");
        let path = write(&dir, &text);

        let err = read_artifact(&path).unwrap_err();
        assert_eq!(err.violation(), Some(&Violation::Empty));
    }

    #[test]
    fn header_only_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, &format!("{}\n", HEADER));

        assert_eq!(read_artifact(&path).unwrap_err().violation(), Some(&Violation::Empty));
    }

    #[test]
    fn extra_and_reordered_columns_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let text = "Note,Altcoin Dominance (%),Bitcoin Dominance (%),Total Market Cap,Ethereum Market Cap,Bitcoin Market Cap,Timestamp,Market Cap Excl Bitcoin\n\
                    x,45,55,1000,300,550,2024-01-01 00:00:00,449\n";
        let path = write(&dir, text);

        let history = read_artifact(&path).unwrap();
        let row = history.first().unwrap();

        assert_eq!(row.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(row.bitcoin_market_cap, decimal("550"));
        assert_eq!(row.altcoin_dominance, decimal("45"));
        assert_eq!(*row.market_cap_excl_bitcoin(), decimal("449"));
    }

    #[test]
    fn missing_altcoin_dominance_is_derived() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!("{}\n{}\n", HEADER, "2024-01-01T00:00:00.000Z,600,200,1000,60.5,");
        let path = write(&dir, &text);

        let history = read_artifact(&path).unwrap();
        assert_eq!(history.first().unwrap().dominance(DominanceMode::AltDom), &decimal("39.5"));
    }

    #[test]
    fn unparseable_values_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!("{}\n{}\n", HEADER, "2024-01-01T00:00:00.000Z,lots,200,1000,60,40");
        let path = write(&dir, &text);

        match read_artifact(&path).unwrap_err() {
            ArtifactError::InvalidValue { column, value, line, .. } => {
                assert_eq!(column, Column::BitcoinMarketCap);
                assert_eq!(value, "lots");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifact(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn seven_day_window_of_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let rows = (0..30)
            .map(|d| row(d, "500", "1000", if d < 23 { "50" } else { "52.5" }))
            .collect();

        write_artifact(&path, &MarketCapHistory::from_rows(rows)).unwrap();
        let history = read_artifact(&path).unwrap();

        assert_eq!(history.in_range(DateRange::SevenDays).len(), 8);
        assert_eq!(history.dominance_change(DominanceMode::Dom, DateRange::SevenDays), Some(decimal("2.5")));
        assert_eq!(history.dominance_change(DominanceMode::Dom, DateRange::OneMonth), Some(decimal("2.5")));
    }

    #[test]
    fn timestamps_parse_with_or_without_zone() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T12:00:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T13:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
