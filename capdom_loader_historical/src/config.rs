use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use log::info;
use capdom_util::{ConfigError, ConfigContext, IntoConfigResult};
use capdom_domain::ext::bigdecimal::RoundingMode;
use capdom_domain::metrics::DominancePrecision;
use capdom_domain::models::CoinId;
use capdom_domain::models::coins::STABLECOINS;
use capdom_data::coingecko::{RateLimitPolicy, DEFAULT_API_URL};

pub const SUPPORTED_VS_CURRENCY: &str = "usd";
pub const MAX_DOMINANCE_DIGITS: i64 = 20;

/// Everything a single pipeline run depends on.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub agent_name: String,
    pub api_url: String,
    pub coin_count: usize,
    pub lookback_days: u32,
    pub vs_currency: String,
    pub excluded_coins: HashSet<CoinId>,
    pub rate_limit_cooldown: Duration,
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub dominance: DominancePrecision,
    pub output_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            agent_name: "loader_historical".into(),
            api_url: DEFAULT_API_URL.into(),
            coin_count: 10,
            lookback_days: 365,
            vs_currency: SUPPORTED_VS_CURRENCY.into(),
            excluded_coins: STABLECOINS.clone(),
            rate_limit_cooldown: Duration::from_secs(60),
            request_delay: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            dominance: DominancePrecision::default(),
            output_path: PathBuf::from("crypto_market_cap_history.csv"),
        }
    }
}

impl PipelineConfig {
    pub fn rate_limit(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(self.rate_limit_cooldown)
    }

    pub fn user_agent(&self) -> String {
        format!("{}/{} ({})", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), self.agent_name)
    }
}

fn collect<T>(errors: &mut Vec<ConfigError>, result: Result<T, ConfigError>, default: T) -> T {
    result.unwrap_or_else(|e| {
        errors.push(e);
        default
    })
}

fn parse_coin_list(raw: &str) -> HashSet<CoinId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(CoinId::from)
        .collect()
}

pub fn config_with_prefix(prefix: &str) -> Result<PipelineConfig, ConfigError> {
    let config = ConfigContext::new(prefix);
    let defaults = PipelineConfig::default();
    let mut errors = Vec::new();

    let agent_name = config.var_or("AGENT_NAME", defaults.agent_name);
    info!("Agent name: '{}'", agent_name);

    let api_url = config.var_or("API_URL", defaults.api_url);
    info!("API URL: '{}'", api_url);

    let coin_count = collect(&mut errors, config.parse_or("COIN_COUNT", defaults.coin_count), 0);

    let lookback_days = match config.parse_or("LOOKBACK_DAYS", defaults.lookback_days) {
        Ok(0) => {
            errors.push(config.invalid("LOOKBACK_DAYS", "0", "must be at least one day"));
            0
        }
        result => collect(&mut errors, result, 0),
    };

    let vs_currency = config.var_or("VS_CURRENCY", defaults.vs_currency).to_ascii_lowercase();
    if vs_currency != SUPPORTED_VS_CURRENCY {
        errors.push(config.invalid("VS_CURRENCY", &vs_currency, format!("only '{}' is supported", SUPPORTED_VS_CURRENCY)));
    }

    let excluded_coins = match config.var("EXCLUDED_COINS") {
        Ok(raw) if !raw.trim().is_empty() => parse_coin_list(&raw),
        _ => defaults.excluded_coins,
    };

    let rate_limit_cooldown = collect(&mut errors,
        config.duration_or("RATE_LIMIT_COOLDOWN", defaults.rate_limit_cooldown),
        defaults.rate_limit_cooldown);
    let request_delay = collect(&mut errors,
        config.duration_or("REQUEST_DELAY", defaults.request_delay),
        defaults.request_delay);
    let request_timeout = collect(&mut errors,
        config.duration_or("REQUEST_TIMEOUT", defaults.request_timeout),
        defaults.request_timeout);

    let digits = match config.parse_or("DOMINANCE_DIGITS", defaults.dominance.digits) {
        Ok(digits) if !(0..=MAX_DOMINANCE_DIGITS).contains(&digits) => {
            errors.push(config.invalid("DOMINANCE_DIGITS", &digits.to_string(),
                format!("must be between 0 and {}", MAX_DOMINANCE_DIGITS)));
            defaults.dominance.digits
        }
        result => collect(&mut errors, result, defaults.dominance.digits),
    };
    let mode = collect(&mut errors,
        config.parse_or::<RoundingMode>("DOMINANCE_ROUNDING", defaults.dominance.mode),
        defaults.dominance.mode);

    let output_path = PathBuf::from(config.var_or("OUTPUT_PATH", defaults.output_path.to_string_lossy()));

    if !errors.is_empty() {
        return Err(errors).into_config_result();
    }

    info!("Top {} coins over {} days in '{}', excluding {} coins", coin_count, lookback_days, vs_currency, excluded_coins.len());
    info!("Rate limit cooldown: {:?}, request delay: {:?}, request timeout: {:?}", rate_limit_cooldown, request_delay, request_timeout);
    info!("Dominance: {} digits, rounding {}", digits, mode);
    info!("Output: '{}'", output_path.display());

    Ok(PipelineConfig {
        agent_name,
        api_url,
        coin_count,
        lookback_days,
        vs_currency,
        excluded_coins,
        rate_limit_cooldown,
        request_delay,
        request_timeout,
        dominance: DominancePrecision { digits, mode },
        output_path,
    })
}
