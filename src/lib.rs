//! Ranked-ladder harvester for the Riot League and Match APIs.
//!
//! Walks the ranked ladder tier by tier, picks the top players of each page,
//! fetches their most recent matches and derives a flat statistics record
//! per player and match. Requests are strictly sequential and self-paced to
//! stay under the API rate limit; throttled and failing calls are retried
//! with exponential backoff.
//!
//! # Quick start
//!
//! ```no_run
//! use ladder_harvest::{FsSink, Harvester};
//!
//! let harvester = Harvester::builder().platform("EUW1").pages_per_division(1).build().unwrap();
//! let mut sink = FsSink::new("./out").unwrap();
//! let report = harvester.run(&mut sink);
//! println!("{}", report.message);
//! ```

pub mod api;
#[cfg(feature = "async")]
pub mod async_client;
pub mod client;
pub mod collector;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod pacing;
pub mod sink;
pub mod stats;
pub mod traverser;

pub use api::{LadderApi, RiotApi};
#[cfg(feature = "async")]
pub use async_client::AsyncHarvester;
pub use client::{FetchOutcome, HttpTransport, RateLimitedClient, RawResponse, RetryPolicy, Transport};
pub use collector::MatchCollector;
pub use config::HarvestConfig;
pub use credentials::{CredentialProvider, EnvCredentials, StaticCredentials};
pub use error::{HarvestError, Result};
pub use models::{DerivedStats, Division, LadderEntry, PlayerMatchSummary, Tier};
pub use pacing::{Pacer, Sleeper, ThreadSleeper};
pub use sink::{FsSink, MemorySink, StorageSink};
pub use traverser::LeaderboardTraverser;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Outcome of a harvest run. Every run ends in one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// 200 on success, 500 on a fatal error.
    pub status_code: u16,
    pub message: String,
    pub matches_processed: usize,
    pub players_stored: usize,
}

impl RunReport {
    fn success(matches_processed: usize, players_stored: usize) -> Self {
        Self {
            status_code: 200,
            message: format!(
                "Successfully processed {matches_processed} matches and stored {players_stored} player summaries."
            ),
            matches_processed,
            players_stored,
        }
    }

    fn failure(message: impl Into<String>, progress: HarvestProgress) -> Self {
        Self {
            status_code: 500,
            message: message.into(),
            matches_processed: progress.matches_processed,
            players_stored: progress.players_stored,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Counters of a run in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestProgress {
    pub players_selected: usize,
    pub players_stored: usize,
    pub matches_processed: usize,
}

// ---------------------------------------------------------------------------
// HarvesterBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Harvester`].
///
/// Use [`Harvester::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](HarvesterBuilder::build).
pub struct HarvesterBuilder {
    config: HarvestConfig,
    credentials: Box<dyn CredentialProvider + Send + Sync>,
    sleeper: Arc<dyn Sleeper>,
    transport: Option<Arc<dyn Transport>>,
    base_urls: Option<(String, String)>,
    tiers: Vec<Tier>,
}

impl Default for HarvesterBuilder {
    fn default() -> Self {
        Self {
            config: HarvestConfig::default(),
            credentials: Box::new(EnvCredentials::default()),
            sleeper: Arc::new(ThreadSleeper),
            transport: None,
            base_urls: None,
            tiers: Tier::ALL.to_vec(),
        }
    }
}

impl HarvesterBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: HarvestConfig) -> Self {
        self.config = config;
        self
    }

    /// Pages fetched per (tier, division). Defaults to 3.
    pub fn pages_per_division(mut self, pages: u32) -> Self {
        self.config.pages_per_division = pages;
        self
    }

    /// Players selected per page. Defaults to 15.
    pub fn top_per_page(mut self, count: usize) -> Self {
        self.config.top_per_page = count;
        self
    }

    /// Platform code, e.g. `JP1` (the default), `EUW1`, `NA1`.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.config.platform = platform.into();
        self
    }

    /// Recent matches fetched per player. Defaults to 3.
    pub fn recent_match_count(mut self, count: u32) -> Self {
        self.config.recent_match_count = count;
        self
    }

    /// Source of the API key. Defaults to the `RIOT_API_KEY` variable.
    pub fn credentials<C>(mut self, credentials: C) -> Self
    where
        C: CredentialProvider + Send + Sync + 'static,
    {
        self.credentials = Box::new(credentials);
        self
    }

    /// Sleeper used for pacing and backoff. Defaults to [`ThreadSleeper`].
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Use `transport` instead of the reqwest client built from the API key.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the league and match hosts.
    pub fn base_urls(mut self, league_base: impl Into<String>, match_base: impl Into<String>) -> Self {
        self.base_urls = Some((league_base.into(), match_base.into()));
        self
    }

    /// Restrict the traversal to `tiers`, in order.
    pub fn tiers(mut self, tiers: &[Tier]) -> Self {
        self.tiers = tiers.to_vec();
        self
    }

    /// Validate the configuration and build the harvester.
    ///
    /// No credentials are read and no requests are made until
    /// [`Harvester::run`].
    pub fn build(self) -> Result<Harvester> {
        let config = self.config.normalized()?;
        Ok(Harvester {
            config,
            credentials: self.credentials,
            sleeper: self.sleeper,
            transport: self.transport,
            base_urls: self.base_urls,
            tiers: self.tiers,
        })
    }
}

// ---------------------------------------------------------------------------
// Harvester
// ---------------------------------------------------------------------------

/// Runs a full ladder harvest.
///
/// Created via [`Harvester::builder()`].
pub struct Harvester {
    config: HarvestConfig,
    credentials: Box<dyn CredentialProvider + Send + Sync>,
    sleeper: Arc<dyn Sleeper>,
    transport: Option<Arc<dyn Transport>>,
    base_urls: Option<(String, String)>,
    tiers: Vec<Tier>,
}

impl Harvester {
    /// Create a new builder.
    pub fn builder() -> HarvesterBuilder {
        HarvesterBuilder::default()
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Run the whole traversal, writing one summary per selected player.
    ///
    /// Always returns a [`RunReport`]. Credential failures abort before any
    /// request; a page fetch that fails after retries aborts the rest of the
    /// run, leaving already written summaries in place.
    pub fn run(&self, sink: &mut dyn StorageSink) -> RunReport {
        let api_key = match self.credentials.api_key() {
            Ok(key) => key,
            Err(e) => {
                tracing::error!("Failed to get API key: {}", e);
                return RunReport::failure("Failed to retrieve API key", HarvestProgress::default());
            }
        };

        let api = match self.riot_api(api_key) {
            Ok(api) => api,
            Err(e) => {
                tracing::error!("Failed to initialize API client: {}", e);
                return RunReport::failure(e.to_string(), HarvestProgress::default());
            }
        };

        self.run_with(&api, sink)
    }

    /// Run against an already constructed [`LadderApi`].
    pub fn run_with<A: LadderApi + ?Sized>(&self, api: &A, sink: &mut dyn StorageSink) -> RunReport {
        let mut progress = HarvestProgress::default();
        match self.harvest(api, sink, &mut progress) {
            Ok(()) => {
                tracing::info!(
                    "Harvest finished: {} players selected, {} stored, {} matches",
                    progress.players_selected,
                    progress.players_stored,
                    progress.matches_processed
                );
                RunReport::success(progress.matches_processed, progress.players_stored)
            }
            Err(e) => {
                tracing::error!("Harvest aborted: {}", e);
                RunReport::failure(e.to_string(), progress)
            }
        }
    }

    fn riot_api(&self, api_key: String) -> Result<RiotApi> {
        let transport: Arc<dyn Transport> = match &self.transport {
            Some(transport) => transport.clone(),
            None => Arc::new(HttpTransport::new(api_key, self.config.request_timeout())?),
        };
        let policy = RetryPolicy::new(self.config.max_attempts, self.config.backoff_base());
        let client = RateLimitedClient::new(transport, policy, self.sleeper.clone());
        Ok(match &self.base_urls {
            Some((league, matches)) => RiotApi::with_base_urls(client, league.as_str(), matches.as_str()),
            None => RiotApi::new(client, &self.config.platform),
        })
    }

    fn harvest<A: LadderApi + ?Sized>(
        &self,
        api: &A,
        sink: &mut dyn StorageSink,
        progress: &mut HarvestProgress,
    ) -> Result<()> {
        let page_pacer = Pacer::new(self.config.page_pause(), self.sleeper.clone());
        let match_pacer = Pacer::new(self.config.match_pause(), self.sleeper.clone());

        let mut traverser = LeaderboardTraverser::with_tiers(
            api,
            &self.tiers,
            self.config.pages_per_division,
            self.config.top_per_page,
            page_pacer,
        );
        let mut collector = MatchCollector::new(api, self.config.recent_match_count, match_pacer);

        for entry in traverser.by_ref() {
            let entry = entry?;
            progress.players_selected += 1;

            let summary = collector.collect(entry);
            progress.matches_processed = collector.processed_matches();

            let key = crate::sink::storage_key(&summary);
            match sink.put(&key, &summary) {
                Ok(()) => {
                    progress.players_stored += 1;
                    tracing::info!("Saved stats for {} to {}", summary.entry.puuid, key);
                }
                Err(e) => tracing::warn!("Failed to store {}: {}", key, e),
            }
        }

        tracing::debug!(
            "Traversal fetched {} pages ({} skipped), {} unique players",
            traverser.pages_fetched(),
            traverser.pages_skipped(),
            traverser.seen().len()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Harvester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiers: Vec<&str> = self.tiers.iter().map(|t| t.as_str()).collect();
        write!(
            f,
            "Harvester(platform={}, region={}, pages={}, top_per_page={}, matches={}, tiers=[{}])",
            self.config.platform,
            self.config.region(),
            self.config.pages_per_division,
            self.config.top_per_page,
            self.config.recent_match_count,
            tiers.join(", ")
        )
    }
}
