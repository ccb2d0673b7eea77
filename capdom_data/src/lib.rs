pub mod coingecko;
pub mod artifact;
