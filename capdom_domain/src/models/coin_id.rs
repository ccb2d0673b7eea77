use std::fmt;
use serde::{Deserialize, Serialize};

/// Opaque CoinGecko coin identifier, e.g. `bitcoin` or `usd-coin`.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(transparent)]
pub struct CoinId(String);

impl CoinId {
    pub fn new(id: impl Into<String>) -> CoinId {
        CoinId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the value column a fetched series of this coin occupies.
    pub fn market_cap_column(&self) -> String {
        format!("{} Market Cap", self.0)
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CoinId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CoinId {
    fn from(id: String) -> Self {
        CoinId(id)
    }
}

impl<'a> From<&'a str> for CoinId {
    fn from(id: &'a str) -> Self {
        CoinId(id.to_owned())
    }
}

pub mod defaults {
    use std::collections::HashSet;
    use crate::models::CoinId;

    lazy_static! {
        pub static ref BITCOIN: CoinId = CoinId::new("bitcoin");

        pub static ref ETHEREUM: CoinId = CoinId::new("ethereum");

        pub static ref STABLECOINS: HashSet<CoinId> = {
            let mut x = HashSet::new();
            x.insert(CoinId::new("tether"));
            x.insert(CoinId::new("usd-coin"));
            x.insert(CoinId::new("paxos-standard"));
            x.insert(CoinId::new("binance-usd"));
            x.insert(CoinId::new("gemini-dollar"));
            x
        };
    }
}
