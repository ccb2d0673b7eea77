//! The column contract of the persisted market cap artifact.
//!
//! The artifact is consumed by a separate dashboard which looks columns up by
//! header name, so header text and order are part of the contract. Any change to
//! either is a new [`SchemaVersion`].

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Column {
    Timestamp,
    BitcoinMarketCap,
    EthereumMarketCap,
    TotalMarketCap,
    BitcoinDominance,
    AltcoinDominance,

    /// Derived by consumers as `Total - Bitcoin`; never written by the loader.
    MarketCapExclBitcoin,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Timestamp => "Timestamp",
            Column::BitcoinMarketCap => "Bitcoin Market Cap",
            Column::EthereumMarketCap => "Ethereum Market Cap",
            Column::TotalMarketCap => "Total Market Cap",
            Column::BitcoinDominance => "Bitcoin Dominance (%)",
            Column::AltcoinDominance => "Altcoin Dominance (%)",
            Column::MarketCapExclBitcoin => "Market Cap Excl Bitcoin",
        }
    }

    /// Rows missing any of these are not fit for the dashboard.
    pub fn is_mandatory(&self) -> bool {
        match self {
            Column::Timestamp
            | Column::BitcoinMarketCap
            | Column::EthereumMarketCap
            | Column::TotalMarketCap
            | Column::BitcoinDominance => true,
            Column::AltcoinDominance
            | Column::MarketCapExclBitcoin => false,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SchemaVersion {
    V1,
}

const V1_COLUMNS: [Column; 6] = [
    Column::Timestamp,
    Column::BitcoinMarketCap,
    Column::EthereumMarketCap,
    Column::TotalMarketCap,
    Column::BitcoinDominance,
    Column::AltcoinDominance,
];

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::V1;

    pub fn number(&self) -> u32 {
        match self {
            SchemaVersion::V1 => 1,
        }
    }

    /// Columns written, in order.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            SchemaVersion::V1 => &V1_COLUMNS,
        }
    }

    /// Columns a row must carry a value for.
    pub fn mandatory_columns(&self) -> impl Iterator<Item = Column> {
        self.columns().iter().copied().filter(Column::is_mandatory)
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.header()).collect()
    }

    /// Required columns absent from `headers`, in schema order.
    pub fn missing_columns<'a, I>(&self, headers: I) -> Vec<Column>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: Vec<&str> = headers.into_iter().map(str::trim).collect();
        self.columns().iter()
            .filter(|c| !present.contains(&c.header()))
            .copied()
            .collect()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}
