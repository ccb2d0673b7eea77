use std::time::Duration;

use log::warn;
use reqwest::StatusCode;
use snafu::ResultExt;

use super::{Clock, HttpReply, Transport, UpstreamError, Request, RateLimited};

/// What to do when CoinGecko answers `429 Too Many Requests`: wait `cooldown`,
/// then repeat the identical request, at most `max_retries` times.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct RateLimitPolicy {
    pub cooldown: Duration,
    pub max_retries: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        RateLimitPolicy::new(Duration::from_secs(60))
    }
}

impl RateLimitPolicy {
    pub fn new(cooldown: Duration) -> RateLimitPolicy {
        RateLimitPolicy { cooldown, max_retries: 1 }
    }

    /// Any reply other than 429 is handed back, successful or not.
    pub async fn get<T, C>(
        &self,
        transport: &T,
        clock: &C,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<HttpReply, UpstreamError>
    where
        T: Transport + ?Sized,
        C: Clock + ?Sized,
    {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let reply = transport.get(path, query).await
                .context(Request { endpoint: path })?;

            if reply.status != StatusCode::TOO_MANY_REQUESTS {
                return Ok(reply);
            }

            if attempts > self.max_retries {
                return RateLimited { endpoint: path, attempts }.fail();
            }

            warn!("Rate limit exceeded while fetching '{}'. Waiting for {:?} (retry {}/{})",
                  path, self.cooldown, attempts, self.max_retries);
            clock.sleep(self.cooldown).await;
        }
    }
}
