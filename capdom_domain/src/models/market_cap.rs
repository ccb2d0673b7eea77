use chrono::{DateTime, Utc};
use bigdecimal::BigDecimal;

use crate::models::CoinId;

#[derive(Clone, Debug, PartialEq)]
pub struct MarketCapSample {
    pub timestamp: DateTime<Utc>,
    pub coin_id: CoinId,
    pub market_cap_usd: BigDecimal,
}

/// Market cap history of a single coin, in the order the API returned it.
///
/// The API returns strictly increasing timestamps; that is relied on, not checked.
#[derive(Clone, Debug, PartialEq)]
pub struct CoinSeries {
    coin_id: CoinId,
    samples: Vec<MarketCapSample>,
}

impl CoinSeries {
    pub fn new(coin_id: CoinId) -> CoinSeries {
        CoinSeries { coin_id, samples: Vec::new() }
    }

    pub fn from_points<I>(coin_id: CoinId, points: I) -> CoinSeries
    where
        I: IntoIterator<Item = (DateTime<Utc>, BigDecimal)>,
    {
        let mut series = CoinSeries::new(coin_id);
        for (timestamp, value) in points {
            series.push(timestamp, value);
        }
        series
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>, market_cap_usd: BigDecimal) {
        self.samples.push(MarketCapSample {
            timestamp,
            coin_id: self.coin_id.clone(),
            market_cap_usd,
        });
    }

    pub fn coin_id(&self) -> &CoinId { &self.coin_id }
    pub fn samples(&self) -> &[MarketCapSample] { &self.samples }
    pub fn len(&self) -> usize { self.samples.len() }
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    pub fn column_name(&self) -> String {
        self.coin_id.market_cap_column()
    }

    pub fn into_samples(self) -> Vec<MarketCapSample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn samples_carry_the_series_coin() {
        let series = CoinSeries::from_points(
            CoinId::new("solana"),
            vec![
                (Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(), BigDecimal::from(10)),
                (Utc.timestamp_millis_opt(1_700_086_400_000).unwrap(), BigDecimal::from(11)),
            ]);

        assert_eq!(series.len(), 2);
        assert!(series.samples().iter().all(|s| s.coin_id.as_str() == "solana"));
        assert_eq!(series.column_name(), "solana Market Cap");
    }
}
