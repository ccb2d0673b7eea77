//! One ingestion run: rank, fetch, merge, derive, and optionally persist.

use std::path::Path;

use log::{debug, info, warn};
use snafu::{Snafu, ResultExt};

use capdom_domain::merge::{merge_primary, merge_zero_filled};
use capdom_domain::metrics;
use capdom_domain::models::{CoinId, CoinSeries, MarketCapHistory};
use capdom_domain::models::coins::{BITCOIN, ETHEREUM};
use capdom_domain::table::MergeError;
use capdom_data::artifact::{write_artifact, ArtifactError};
use capdom_data::coingecko::{Clock, CoinGeckoClient, Transport, UpstreamError};

use crate::config::PipelineConfig;

#[derive(Snafu, Debug)]
pub enum PipelineError {
    #[snafu(display("Failed to select top coins: {}", source))]
    Selection {
        source: UpstreamError,
    },

    #[snafu(display("Failed to fetch market cap history of '{}': {}", coin, source))]
    Fetch {
        coin: CoinId,
        source: UpstreamError,
    },

    #[snafu(display("Failed to merge market cap series: {}", source))]
    Merge {
        source: MergeError,
    },

    #[snafu(display("None of {} merged rows is complete; nothing to persist", merged))]
    NoCompleteRows {
        merged: usize,
    },

    #[snafu(display("Failed to persist market cap history: {}", source))]
    Persist {
        source: ArtifactError,
    },
}

/// Issues history requests, waiting the configured delay between consecutive ones.
struct Fetcher<'a, T, C> {
    client: &'a CoinGeckoClient<T, C>,
    config: &'a PipelineConfig,
    requests: usize,
}

impl<'a, T, C> Fetcher<'a, T, C>
where
    T: Transport,
    C: Clock,
{
    async fn fetch(&mut self, coin: &CoinId) -> Result<CoinSeries, PipelineError> {
        if self.requests > 0 {
            debug!("Waiting {:?} before requesting '{}'", self.config.request_delay, coin);
            self.client.clock().sleep(self.config.request_delay).await;
        }
        self.requests += 1;

        self.client
            .market_cap_history(coin, self.config.lookback_days, &self.config.vs_currency)
            .await
            .context(Fetch { coin: coin.clone() })
    }
}

/// Builds the complete market cap history without touching the artifact.
///
/// Any failure aborts the whole run; nothing fetched so far is kept.
pub async fn run<T, C>(
    client: &CoinGeckoClient<T, C>,
    config: &PipelineConfig,
) -> Result<MarketCapHistory, PipelineError>
where
    T: Transport,
    C: Clock,
{
    let selected = client
        .top_coins(config.coin_count, &config.vs_currency, &config.excluded_coins)
        .await
        .context(Selection)?;

    let mut fetcher = Fetcher { client, config, requests: 0 };

    info!("Fetching data for {} and {}", *BITCOIN, *ETHEREUM);
    let bitcoin = fetcher.fetch(&BITCOIN).await?;
    let ethereum = fetcher.fetch(&ETHEREUM).await?;

    let mut all = Vec::with_capacity(selected.len());
    for (index, coin) in selected.iter().enumerate() {
        info!("Fetching data for {} ({}/{})", coin, index + 1, selected.len());

        let series = if coin == &*BITCOIN {
            bitcoin.clone()
        } else if coin == &*ETHEREUM {
            ethereum.clone()
        } else {
            fetcher.fetch(coin).await?
        };
        all.push(series);
    }

    let primary = merge_primary(bitcoin, ethereum).context(Merge)?;
    let zero_filled = merge_zero_filled(all).context(Merge)?;
    let merged = metrics::derive(primary, zero_filled, &BITCOIN, &ETHEREUM, config.dominance)
        .context(Merge)?;

    let merged_rows = merged.len();
    let (history, dropped) = merged.into_history();
    if dropped > 0 {
        warn!("Dropped {} of {} rows with missing values", dropped, merged_rows);
    }

    if history.is_empty() {
        return NoCompleteRows { merged: merged_rows }.fail();
    }

    info!("Derived {} complete rows from {} coins", history.len(), selected.len());
    Ok(history)
}

/// [`run`], then replace the artifact at `path`. The artifact is only
/// touched once the run has succeeded.
pub async fn run_to_artifact<T, C>(
    client: &CoinGeckoClient<T, C>,
    config: &PipelineConfig,
    path: &Path,
) -> Result<MarketCapHistory, PipelineError>
where
    T: Transport,
    C: Clock,
{
    let history = run(client, config).await?;
    write_artifact(path, &history).context(Persist)?;
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::str::FromStr;
    use std::time::Duration;
    use bigdecimal::BigDecimal;
    use capdom_data::coingecko::StatusCode;
    use capdom_data::coingecko::markets::COINS_MARKETS;
    use capdom_data::coingecko::testing::{ScriptedTransport, RecordingClock, markets_body, market_chart_body};
    use capdom_data::artifact::read_artifact;

    const BITCOIN_PATH: &str = "coins/bitcoin/market_chart";
    const ETHEREUM_PATH: &str = "coins/ethereum/market_chart";
    const SOLANA_PATH: &str = "coins/solana/market_chart";

    fn day(n: i64) -> i64 {
        1_704_067_200_000 + n * 86_400_000
    }

    fn decimal(x: impl AsRef<str>) -> BigDecimal {
        BigDecimal::from_str(x.as_ref()).unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            coin_count: 3,
            request_delay: Duration::from_secs(10),
            rate_limit_cooldown: Duration::from_secs(60),
            ..PipelineConfig::default()
        }
    }

    struct Script {
        transport: ScriptedTransport,
    }

    impl Script {
        fn new() -> Script {
            let transport = ScriptedTransport::new();
            transport.reply(COINS_MARKETS, StatusCode::OK,
                            markets_body(&["bitcoin", "ethereum", "tether", "solana", "ripple"]));
            Script { transport }
        }

        fn chart(self, path: &str, points: &[(i64, &str)]) -> Script {
            let points: Vec<(i64, &str)> = points.iter().map(|(d, v)| (day(*d), *v)).collect();
            self.transport.reply(path, StatusCode::OK, market_chart_body(&points));
            self
        }

        fn status(self, path: &str, status: StatusCode) -> Script {
            self.transport.reply(path, status, "");
            self
        }

        fn client(self, config: &PipelineConfig) -> CoinGeckoClient<ScriptedTransport, RecordingClock> {
            CoinGeckoClient::new(self.transport, RecordingClock::new(), config.rate_limit())
        }
    }

    fn full_script() -> Script {
        Script::new()
            .chart(BITCOIN_PATH, &[(0, "600"), (1, "610"), (2, "620")])
            .chart(ETHEREUM_PATH, &[(0, "250"), (1, "260"), (2, "270")])
            .chart(SOLANA_PATH, &[(0, "150"), (1, "130"), (2, "null")])
    }

    #[tokio::test]
    async fn full_run_derives_totals_and_dominance() {
        let config = config();
        let client = full_script().client(&config);

        let history = run(&client, &config).await.unwrap();

        assert_eq!(history.len(), 3);
        let totals: Vec<_> = history.rows().iter().map(|r| r.total_market_cap.clone()).collect();
        assert_eq!(totals, vec![decimal("1000"), decimal("1000"), decimal("890")]);

        let first = history.first().unwrap();
        assert_eq!(first.bitcoin_dominance, decimal("60"));
        assert_eq!(first.altcoin_dominance, decimal("40"));

        for row in history.rows() {
            assert_eq!(&row.bitcoin_dominance + &row.altcoin_dominance, BigDecimal::from(100));
        }
    }

    #[tokio::test]
    async fn majors_are_fetched_once_and_requests_are_paced() {
        let config = config();
        let client = full_script().client(&config);

        run(&client, &config).await.unwrap();

        assert_eq!(client.transport().paths(), vec![
            COINS_MARKETS, BITCOIN_PATH, ETHEREUM_PATH, SOLANA_PATH,
        ]);
        assert_eq!(client.clock().sleeps(), vec![Duration::from_secs(10); 2]);
    }

    #[tokio::test]
    async fn excluded_coins_are_neither_fetched_nor_summed() {
        let mut config = PipelineConfig { coin_count: 4, ..config() };
        config.excluded_coins.insert(CoinId::new("ripple"));
        let client = full_script()
            .chart("coins/tether/market_chart", &[(0, "5000"), (1, "5000"), (2, "5000")])
            .chart("coins/ripple/market_chart", &[(0, "7000"), (1, "7000"), (2, "7000")])
            .client(&config);

        let history = run(&client, &config).await.unwrap();

        assert_eq!(client.transport().requests_to("coins/tether/market_chart"), 0);
        assert_eq!(client.transport().requests_to("coins/ripple/market_chart"), 0);
        assert_eq!(client.transport().paths(), vec![
            COINS_MARKETS, BITCOIN_PATH, ETHEREUM_PATH, SOLANA_PATH,
        ]);

        let totals: Vec<_> = history.rows().iter().map(|r| r.total_market_cap.clone()).collect();
        assert_eq!(totals, vec![decimal("1000"), decimal("1000"), decimal("890")]);
    }

    #[tokio::test]
    async fn missing_primary_values_drop_rows() {
        let config = config();
        let client = Script::new()
            .chart(BITCOIN_PATH, &[(1, "500"), (2, "520")])
            .chart(ETHEREUM_PATH, &[(1, "200"), (3, "210")])
            .chart(SOLANA_PATH, &[(1, "300"), (4, "1")])
            .client(&config);

        let history = run(&client, &config).await.unwrap();

        assert_eq!(history.len(), 1);
        let row = history.first().unwrap();
        assert_eq!(row.total_market_cap, decimal("1000"));
        assert_eq!(row.bitcoin_dominance, decimal("50"));
    }

    #[tokio::test]
    async fn rate_limited_history_is_retried_once() {
        let config = config();
        let client = Script::new()
            .status(BITCOIN_PATH, StatusCode::TOO_MANY_REQUESTS)
            .chart(BITCOIN_PATH, &[(0, "600")])
            .chart(ETHEREUM_PATH, &[(0, "250")])
            .chart(SOLANA_PATH, &[(0, "150")])
            .client(&config);

        let history = run(&client, &config).await.unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(client.clock().sleeps(), vec![
            Duration::from_secs(60),
            Duration::from_secs(10),
            Duration::from_secs(10),
        ]);
    }

    #[tokio::test]
    async fn second_rate_limit_leaves_previous_artifact_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(&path, "previous artifact").unwrap();

        let config = config();
        let client = Script::new()
            .chart(BITCOIN_PATH, &[(0, "600")])
            .status(ETHEREUM_PATH, StatusCode::TOO_MANY_REQUESTS)
            .status(ETHEREUM_PATH, StatusCode::TOO_MANY_REQUESTS)
            .client(&config);

        let err = run_to_artifact(&client, &config, &path).await.unwrap_err();

        match &err {
            PipelineError::Fetch { coin, source } => {
                assert_eq!(coin, &*ETHEREUM);
                assert!(source.is_rate_limited());
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous artifact");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(client.transport().requests_to(SOLANA_PATH), 0);
    }

    #[tokio::test]
    async fn failed_ranking_fetches_nothing() {
        let config = config();
        let transport = ScriptedTransport::new();
        transport.reply(COINS_MARKETS, StatusCode::INTERNAL_SERVER_ERROR, "");
        let client = CoinGeckoClient::new(transport, RecordingClock::new(), config.rate_limit());

        let err = run(&client, &config).await.unwrap_err();

        assert!(matches!(err, PipelineError::Selection { .. }));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn no_complete_rows_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let config = config();
        let client = Script::new()
            .chart(BITCOIN_PATH, &[(0, "600")])
            .chart(ETHEREUM_PATH, &[(1, "250")])
            .chart(SOLANA_PATH, &[(2, "150")])
            .client(&config);

        let err = run_to_artifact(&client, &config, &path).await.unwrap_err();

        assert!(matches!(err, PipelineError::NoCompleteRows { merged: 3 }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn persisted_artifact_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let config = config();
        let client = full_script().client(&config);

        let history = run_to_artifact(&client, &config, &path).await.unwrap();

        assert_eq!(read_artifact(&path).unwrap(), history);
    }
}
