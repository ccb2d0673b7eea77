use std::fmt;
use bigdecimal::BigDecimal;

/// Which side of the Bitcoin/altcoin split a dominance value describes.
#[derive(Eq, PartialEq, Copy, Clone, Hash, Debug)]
pub enum DominanceMode {
    Dom,
    AltDom
}

impl DominanceMode {
    /// The value of the opposite side, given this side's percentage.
    pub fn complement(value: &BigDecimal) -> BigDecimal {
        &BigDecimal::from(100) - value
    }
}

impl fmt::Display for DominanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DominanceMode::Dom => f.write_str("BTC.D"),
            DominanceMode::AltDom => f.write_str("ALT.D"),
        }
    }
}
