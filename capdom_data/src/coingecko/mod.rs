//! CoinGecko public API: coin ranking and per-coin market cap history.

use snafu::Snafu;

pub use reqwest::StatusCode;

mod transport;
pub use transport::{Transport, HttpReply, ReqwestTransport};

mod clock;
pub use clock::{Clock, TokioClock};

mod rate_limit;
pub use rate_limit::RateLimitPolicy;

mod client;
pub use client::{CoinGeckoClient, DEFAULT_API_URL};

pub mod markets;
pub mod market_chart;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[derive(Snafu, Debug)]
pub enum TransportError {
    #[snafu(display("Failed to complete HTTP request: {}", source))]
    Http {
        source: reqwest::Error,
    },

    #[snafu(display("{}", message))]
    Other {
        message: String,
    },
}

/// A CoinGecko call that cannot be recovered; the run is aborted.
#[derive(Snafu, Debug)]
pub enum UpstreamError {
    #[snafu(display("Request to '{}' failed: {}", endpoint, source))]
    Request {
        endpoint: String,
        source: TransportError,
    },

    #[snafu(display("'{}' responded with HTTP {}", endpoint, status))]
    BadStatus {
        endpoint: String,
        status: StatusCode,
    },

    #[snafu(display("'{}' still rate limited after {} attempts", endpoint, attempts))]
    RateLimited {
        endpoint: String,
        attempts: u32,
    },

    #[snafu(display("Failed to deserialize response from '{}': {}", endpoint, source))]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },
}

impl UpstreamError {
    pub fn endpoint(&self) -> &str {
        match self {
            UpstreamError::Request { endpoint, .. }
            | UpstreamError::BadStatus { endpoint, .. }
            | UpstreamError::RateLimited { endpoint, .. }
            | UpstreamError::Deserialization { endpoint, .. } => endpoint,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        match self {
            UpstreamError::RateLimited { .. } => true,
            UpstreamError::BadStatus { status, .. } => *status == StatusCode::TOO_MANY_REQUESTS,
            _ => false,
        }
    }
}

fn ensure_success(endpoint: &str, reply: &HttpReply) -> Result<(), UpstreamError> {
    if reply.status.is_success() {
        Ok(())
    } else {
        BadStatus { endpoint, status: reply.status }.fail()
    }
}
