use chrono::{DateTime, Utc};
use bigdecimal::BigDecimal;

use crate::models::{DominanceMode, MarketCapRow, MarketCapHistory};
use crate::schema::{Column, SchemaVersion};

/// A row before the mandatory-column check; any value may be missing.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedRow {
    pub timestamp: DateTime<Utc>,
    pub bitcoin_market_cap: Option<BigDecimal>,
    pub ethereum_market_cap: Option<BigDecimal>,
    pub total_market_cap: Option<BigDecimal>,
    pub bitcoin_dominance: Option<BigDecimal>,
    pub altcoin_dominance: Option<BigDecimal>,
}

impl MergedRow {
    pub fn has_value(&self, column: Column) -> bool {
        match column {
            Column::Timestamp => true,
            Column::BitcoinMarketCap => self.bitcoin_market_cap.is_some(),
            Column::EthereumMarketCap => self.ethereum_market_cap.is_some(),
            Column::TotalMarketCap => self.total_market_cap.is_some(),
            Column::BitcoinDominance => self.bitcoin_dominance.is_some(),
            Column::AltcoinDominance => self.altcoin_dominance.is_some()
                || self.bitcoin_dominance.is_some(),
            Column::MarketCapExclBitcoin => self.total_market_cap.is_some()
                && self.bitcoin_market_cap.is_some(),
        }
    }

    /// Whether every mandatory column of the current schema has a value.
    pub fn is_complete(&self) -> bool {
        SchemaVersion::CURRENT.mandatory_columns().all(|c| self.has_value(c))
    }

    /// Altcoin dominance is derived from Bitcoin dominance when absent.
    pub fn into_complete(self) -> Option<MarketCapRow> {
        if !self.is_complete() {
            return None;
        }

        let bitcoin_dominance = self.bitcoin_dominance?;
        let altcoin_dominance = self.altcoin_dominance
            .unwrap_or_else(|| DominanceMode::complement(&bitcoin_dominance));

        Some(MarketCapRow {
            timestamp: self.timestamp,
            bitcoin_market_cap: self.bitcoin_market_cap?,
            ethereum_market_cap: self.ethereum_market_cap?,
            total_market_cap: self.total_market_cap?,
            bitcoin_dominance,
            altcoin_dominance,
            reported_excl_bitcoin: None,
        })
    }
}

/// Primary columns joined with totals and dominance, ascending by timestamp.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MergedTable {
    rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn new(mut rows: Vec<MergedRow>) -> MergedTable {
        rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        MergedTable { rows }
    }

    pub fn rows(&self) -> &[MergedRow] { &self.rows }
    pub fn len(&self) -> usize { self.rows.len() }

    /// Keeps complete rows only. Returns the history and the number of rows dropped.
    pub fn into_history(self) -> (MarketCapHistory, usize) {
        let total = self.rows.len();
        let rows: Vec<_> = self.rows.into_iter()
            .filter_map(MergedRow::into_complete)
            .collect();
        let dropped = total - rows.len();
        (MarketCapHistory::from_rows(rows), dropped)
    }
}
