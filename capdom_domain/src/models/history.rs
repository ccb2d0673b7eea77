use std::borrow::Cow;

use chrono::{DateTime, Utc};
use bigdecimal::BigDecimal;

use crate::models::{DateRange, DominanceMode};

/// One complete row of the persisted artifact.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketCapRow {
    pub timestamp: DateTime<Utc>,
    pub bitcoin_market_cap: BigDecimal,
    pub ethereum_market_cap: BigDecimal,
    pub total_market_cap: BigDecimal,
    pub bitcoin_dominance: BigDecimal,
    pub altcoin_dominance: BigDecimal,

    /// Set only when read from an artifact that carries the column explicitly.
    pub reported_excl_bitcoin: Option<BigDecimal>,
}

impl MarketCapRow {
    pub fn market_cap_excl_bitcoin(&self) -> Cow<'_, BigDecimal> {
        match &self.reported_excl_bitcoin {
            Some(x) => Cow::Borrowed(x),
            None => Cow::Owned(&self.total_market_cap - &self.bitcoin_market_cap),
        }
    }

    pub fn dominance(&self, mode: DominanceMode) -> &BigDecimal {
        match mode {
            DominanceMode::Dom => &self.bitcoin_dominance,
            DominanceMode::AltDom => &self.altcoin_dominance,
        }
    }
}

/// Complete rows ordered by ascending, unique timestamp.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MarketCapHistory {
    rows: Vec<MarketCapRow>,
}

impl MarketCapHistory {
    /// Sorts by timestamp; of several rows at one timestamp the first is kept.
    pub fn from_rows(mut rows: Vec<MarketCapRow>) -> MarketCapHistory {
        rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        rows.dedup_by(|next, prev| next.timestamp == prev.timestamp);
        MarketCapHistory { rows }
    }

    pub fn rows(&self) -> &[MarketCapRow] { &self.rows }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn first(&self) -> Option<&MarketCapRow> { self.rows.first() }
    pub fn latest(&self) -> Option<&MarketCapRow> { self.rows.last() }

    /// Rows from `range`'s lookback before the latest timestamp up to the latest, inclusive.
    pub fn in_range(&self, range: DateRange) -> MarketCapHistory {
        let end = match self.latest() {
            None => return MarketCapHistory::default(),
            Some(row) => row.timestamp,
        };

        let rows = match range.start_before(end) {
            None => self.rows.clone(),
            Some(start) => self.rows.iter()
                .filter(|r| r.timestamp >= start && r.timestamp <= end)
                .cloned()
                .collect(),
        };

        MarketCapHistory { rows }
    }

    /// Latest minus earliest dominance within `range`.
    pub fn dominance_change(&self, mode: DominanceMode, range: DateRange) -> Option<BigDecimal> {
        let window = self.in_range(range);
        let first = window.first()?;
        let last = window.latest()?;
        Some(last.dominance(mode) - first.dominance(mode))
    }
}
