//! `coins/markets`: coins ranked by market cap.

use std::collections::HashSet;

use log::{debug, info};
use serde::Deserialize;
use snafu::ResultExt;

use capdom_domain::models::CoinId;

use super::{ensure_success, Clock, CoinGeckoClient, Transport, UpstreamError, Request, Deserialization};

pub const COINS_MARKETS: &str = "coins/markets";

/// Largest page the endpoint serves.
pub const MAX_PER_PAGE: usize = 250;

#[derive(Deserialize, Clone, Debug)]
pub struct CoinMarket {
    pub id: CoinId,
}

impl<T, C> CoinGeckoClient<T, C>
where
    T: Transport,
    C: Clock,
{
    /// The `n` highest ranked coins not in `excluded`, in rank order.
    ///
    /// Twice `n` coins are requested so exclusions can be skipped while
    /// still filling `n`; fewer are returned when the page runs out.
    /// Rate limiting is not retried here.
    pub async fn top_coins(
        &self,
        n: usize,
        vs_currency: &str,
        excluded: &HashSet<CoinId>,
    ) -> Result<Vec<CoinId>, UpstreamError> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let per_page = n.saturating_mul(2).min(MAX_PER_PAGE);
        let query = [
            ("vs_currency", vs_currency.to_owned()),
            ("order", "market_cap_desc".to_owned()),
            ("per_page", per_page.to_string()),
            ("page", "1".to_owned()),
            ("sparkline", "false".to_owned()),
        ];

        let reply = self.transport().get(COINS_MARKETS, &query).await
            .context(Request { endpoint: COINS_MARKETS })?;
        ensure_success(COINS_MARKETS, &reply)?;

        let markets: Vec<CoinMarket> = serde_json::from_slice(&reply.body)
            .context(Deserialization { endpoint: COINS_MARKETS })?;
        debug!("'{}' returned {} coins", COINS_MARKETS, markets.len());

        let selected = select_ids(markets, n, excluded);
        info!("Selected top {} of {} requested coins: {:?}",
              selected.len(), n,
              selected.iter().map(CoinId::as_str).collect::<Vec<_>>());

        Ok(selected)
    }
}

/// First `n` distinct ids not in `excluded`, keeping ranking order.
pub fn select_ids(markets: Vec<CoinMarket>, n: usize, excluded: &HashSet<CoinId>) -> Vec<CoinId> {
    let mut seen = HashSet::new();
    markets.into_iter()
        .map(|m| m.id)
        .filter(|id| !excluded.contains(id))
        .filter(|id| seen.insert(id.clone()))
        .take(n)
        .collect()
}
