use super::{Clock, RateLimitPolicy, Transport};

pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3/";

/// CoinGecko endpoints over a [`Transport`], with 429 handling paced by a [`Clock`].
///
/// The endpoint calls live next to their response models in
/// [`markets`](super::markets) and [`market_chart`](super::market_chart).
pub struct CoinGeckoClient<T, C> {
    transport: T,
    clock: C,
    rate_limit: RateLimitPolicy,
}

impl<T, C> CoinGeckoClient<T, C>
where
    T: Transport,
    C: Clock,
{
    pub fn new(transport: T, clock: C, rate_limit: RateLimitPolicy) -> CoinGeckoClient<T, C> {
        CoinGeckoClient { transport, clock, rate_limit }
    }

    pub fn transport(&self) -> &T { &self.transport }
    pub fn clock(&self) -> &C { &self.clock }
    pub fn rate_limit(&self) -> &RateLimitPolicy { &self.rate_limit }
}
