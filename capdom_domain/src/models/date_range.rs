use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Duration, Utc};
use snafu::Snafu;

/// Windows offered by the dashboard, anchored at the latest timestamp.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DateRange {
    SevenDays,
    OneMonth,
    ThreeMonths,
    All,
}

impl DateRange {
    pub fn lookback(&self) -> Option<Duration> {
        match self {
            DateRange::SevenDays => Some(Duration::days(7)),
            DateRange::OneMonth => Some(Duration::days(30)),
            DateRange::ThreeMonths => Some(Duration::days(90)),
            DateRange::All => None,
        }
    }

    /// `None` means unbounded.
    pub fn start_before(&self, end: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lookback().map(|d| end - d)
    }
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::All
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::SevenDays => f.write_str("7D"),
            DateRange::OneMonth => f.write_str("1 Month"),
            DateRange::ThreeMonths => f.write_str("3 Month"),
            DateRange::All => f.write_str("All"),
        }
    }
}

#[derive(Snafu, Debug)]
pub enum DateRangeParseError {
    #[snafu(display("Invalid date range specified: '{}'", input))]
    InvalidFormat {
        input: String,
    }
}

impl FromStr for DateRange {
    type Err = DateRangeParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "")
            .as_str()
        {
            "7d" | "7days" | "1w" => Ok(DateRange::SevenDays),
            "1month" | "1m" | "30d" => Ok(DateRange::OneMonth),
            "3month" | "3months" | "3m" | "90d" => Ok(DateRange::ThreeMonths),
            "all" | "" => Ok(DateRange::All),
            _ => InvalidFormat { input: s.to_owned() }.fail()
        }
    }
}
