//! `coins/{id}/market_chart`: a coin's daily market cap history.

use chrono::{DateTime, Utc};
use chrono::serde::ts_milliseconds;
use bigdecimal::BigDecimal;
use log::{debug, info};
use serde::Deserialize;
use serde_with::serde_as;
use snafu::ResultExt;

use capdom_domain::models::{CoinId, CoinSeries};
use capdom_ext_serde::BigDecimalExact;

use super::{ensure_success, Clock, CoinGeckoClient, Transport, UpstreamError, Deserialization};

#[serde_as]
#[derive(Deserialize, Debug)]
pub struct MarketCapEntry(
    #[serde(with = "ts_milliseconds")]
    pub DateTime<Utc>,
    #[serde_as(as = "Option<BigDecimalExact>")]
    pub Option<BigDecimal>,
);

/// Only `market_caps` is read; `prices` and `total_volumes` are ignored.
#[derive(Deserialize, Debug)]
pub struct MarketChartResponse {
    pub market_caps: Vec<MarketCapEntry>,
}

impl MarketChartResponse {
    /// Entries without a value are skipped.
    pub fn into_series(self, coin_id: CoinId) -> CoinSeries {
        CoinSeries::from_points(
            coin_id,
            self.market_caps.into_iter()
                .filter_map(|MarketCapEntry(ts, value)| value.map(|v| (ts, v))))
    }
}

pub fn market_chart_path(coin_id: &CoinId) -> String {
    format!("coins/{}/market_chart", coin_id)
}

impl<T, C> CoinGeckoClient<T, C>
where
    T: Transport,
    C: Clock,
{
    /// Daily market caps of `coin_id` over the last `days` days.
    ///
    /// A single 429 is waited out and retried according to the client's
    /// [`RateLimitPolicy`](super::RateLimitPolicy).
    pub async fn market_cap_history(
        &self,
        coin_id: &CoinId,
        days: u32,
        vs_currency: &str,
    ) -> Result<CoinSeries, UpstreamError> {
        let path = market_chart_path(coin_id);
        let query = [
            ("vs_currency", vs_currency.to_owned()),
            ("days", days.to_string()),
            ("interval", "daily".to_owned()),
        ];

        let reply = self.rate_limit()
            .get(self.transport(), self.clock(), &path, &query)
            .await?;
        ensure_success(&path, &reply)?;

        let response: MarketChartResponse = serde_json::from_slice(&reply.body)
            .context(Deserialization { endpoint: path.as_str() })?;

        let total = response.market_caps.len();
        let series = response.into_series(coin_id.clone());
        if series.len() < total {
            debug!("Skipped {} empty market cap entries for '{}'", total - series.len(), coin_id);
        }
        info!("Fetched {} daily market caps for '{}'", series.len(), coin_id);

        Ok(series)
    }
}
