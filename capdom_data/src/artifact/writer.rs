use std::path::Path;

use bigdecimal::BigDecimal;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use snafu::ResultExt;
use tempfile::NamedTempFile;

use capdom_domain::models::{MarketCapHistory, MarketCapRow};
use capdom_domain::schema::{Column, SchemaVersion};

use super::{ArtifactError, Io, Csv};

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn cell(row: &MarketCapRow, column: Column) -> String {
    match column {
        Column::Timestamp => format_timestamp(&row.timestamp),
        Column::BitcoinMarketCap => row.bitcoin_market_cap.to_string(),
        Column::EthereumMarketCap => row.ethereum_market_cap.to_string(),
        Column::TotalMarketCap => row.total_market_cap.to_string(),
        Column::BitcoinDominance => row.bitcoin_dominance.to_string(),
        Column::AltcoinDominance => row.altcoin_dominance.to_string(),
        Column::MarketCapExclBitcoin => row.market_cap_excl_bitcoin().to_string(),
    }
}

fn is_percentage(value: &BigDecimal) -> bool {
    *value >= BigDecimal::from(0) && *value <= BigDecimal::from(100)
}

/// Replaces the artifact at `path` with `history`.
///
/// Rows go to a temporary file beside `path` which is then renamed over it;
/// on error the previous artifact is left as it was.
pub fn write_artifact(path: &Path, history: &MarketCapHistory) -> Result<(), ArtifactError> {
    let schema = SchemaVersion::CURRENT;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).context(Io { path: dir })?;
    {
        let mut writer = csv::Writer::from_writer(&mut file);
        writer.write_record(schema.headers()).context(Csv { path })?;

        for row in history.rows() {
            if !is_percentage(&row.bitcoin_dominance) || !is_percentage(&row.altcoin_dominance) {
                warn!("Dominance out of range at {}: {}% / {}%",
                      format_timestamp(&row.timestamp), row.bitcoin_dominance, row.altcoin_dominance);
            }

            let record: Vec<String> = schema.columns().iter()
                .map(|c| cell(row, *c))
                .collect();
            writer.write_record(&record).context(Csv { path })?;
        }

        writer.flush().context(Io { path })?;
    }
    file.as_file().sync_all().context(Io { path })?;

    file.persist(path)
        .map_err(|e| e.error)
        .context(Io { path })?;

    info!("Wrote {} rows to '{}' (schema {})", history.len(), path.display(), schema);
    Ok(())
}
