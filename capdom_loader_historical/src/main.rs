use std::error::Error;
use log::{info, error};

use capdom_util::init_logging;
use capdom_domain::models::{DateRange, DominanceMode};
use capdom_data::artifact::read_artifact;
use capdom_data::coingecko::{CoinGeckoClient, ReqwestTransport, TokioClock};
use capdom_loader_historical::{config_with_prefix, run_to_artifact};

const DEFAULT_LOG_FILTERS: &'static str = "info,capdom_loader_historical=debug,capdom_data=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let env_result = dotenv::dotenv();
    init_logging(DEFAULT_LOG_FILTERS);

    if let Err(err) = env_result {
        error!("Failed to load .env file: {}", err);
    }

    let config = config_with_prefix("CAPDOM_LOADER_HIST")?;

    let transport = ReqwestTransport::new(&config.api_url, config.request_timeout, config.user_agent())?;
    let client = CoinGeckoClient::new(transport, TokioClock, config.rate_limit());

    let history = run_to_artifact(&client, &config, &config.output_path).await?;
    info!("Historical total market cap data saved to '{}' ({} rows)", config.output_path.display(), history.len());

    // Read back through the consumer's checks
    let persisted = read_artifact(&config.output_path)?;
    if let Some(latest) = persisted.latest() {
        info!("Latest ({}): bitcoin {} USD, total {} USD, excl. bitcoin {} USD",
              latest.timestamp,
              latest.bitcoin_market_cap,
              latest.total_market_cap,
              latest.market_cap_excl_bitcoin());

        for mode in &[DominanceMode::Dom, DominanceMode::AltDom] {
            let change = persisted.dominance_change(*mode, DateRange::SevenDays)
                .map(|c| c.to_string())
                .unwrap_or_else(|| "n/a".into());
            info!("{}: {}% ({} change: {})", mode, latest.dominance(*mode), DateRange::SevenDays, change);
        }
    }

    info!("Done.");

    Ok(())
}
