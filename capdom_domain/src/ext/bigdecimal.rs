use snafu::Snafu;
use bigdecimal::{BigDecimal, Signed};
use num_bigint::BigInt;
use num_integer::Integer;
use std::str::FromStr;
use std::fmt;
use serde::{Serialize, Deserialize, Deserializer, de};

#[derive(Serialize, Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingMode {
    None,
    HalfUp,
    Down,
}

impl Default for RoundingMode {
    fn default() -> Self {
        RoundingMode::HalfUp
    }
}

impl<'de> Deserialize<'de> for RoundingMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de>
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

#[derive(Snafu, Debug)]
pub enum RoundingModeParseError {
    #[snafu(display("Invalid rounding mode specified: '{}'", input))]
    InvalidFormat {
        input: String,
    }
}

impl FromStr for RoundingMode {
    type Err = RoundingModeParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "")
            .as_str()
        {
            "halfup" => Ok(RoundingMode::HalfUp),
            "down" => Ok(RoundingMode::Down),
            "none" | "ignore" | "" => Ok(RoundingMode::None),
            _ => InvalidFormat { input: s.to_owned() }.fail()
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::None => f.write_str("none"),
            RoundingMode::HalfUp => f.write_str("half_up"),
            RoundingMode::Down => f.write_str("down"),
        }
    }
}

pub trait RoundExt {
    fn with_rounding(&self, round_digits: i64, mode: RoundingMode) -> Self;
}

impl RoundExt for BigDecimal {
    fn with_rounding(&self, round_digits: i64, mode: RoundingMode) -> Self {
        match mode {
            RoundingMode::None =>
                self.clone(),
            // `BigDecimal::round` goes through i128, so round on the BigInt.
            // Half-up only looks at the first discarded digit.
            RoundingMode::HalfUp => {
                let (digits, _) = self.with_scale(round_digits + 1).as_bigint_and_exponent();
                let (kept, dropped) = digits.div_rem(&BigInt::from(10));
                let kept = if dropped.abs() >= BigInt::from(5) {
                    kept + dropped.signum()
                } else {
                    kept
                };
                BigDecimal::new(kept, round_digits)
            },
            RoundingMode::Down =>
                self.with_scale(round_digits),
        }
    }
}
