//! The four remote operations the harvest needs, over a [`RateLimitedClient`].
//!
//! League endpoints live on the platform host (`jp1.api.riotgames.com`),
//! match endpoints on the regional host (`asia.api.riotgames.com`).

use crate::client::{FetchOutcome, RateLimitedClient};
use crate::config::{self, QUEUE};
use crate::error::HarvestError;
use crate::models::{Division, Tier};

/// Remote ladder and match operations.
///
/// Each call returns the JSON payload, a not-found marker, or a failure.
pub trait LadderApi {
    /// Unpaginated leaderboard object of an apex tier.
    fn top_leaderboard(&self, tier: Tier) -> FetchOutcome;

    /// One page of entries for a non-apex (tier, division).
    fn entries_page(&self, tier: Tier, division: Division, page: u32) -> FetchOutcome;

    /// Up to `count` most recent match ids of a player.
    fn recent_match_ids(&self, puuid: &str, count: u32) -> FetchOutcome;

    /// Full match-detail payload.
    fn match_detail(&self, match_id: &str) -> FetchOutcome;
}

// ---------------------------------------------------------------------------
// RiotApi
// ---------------------------------------------------------------------------

/// [`LadderApi`] against the Riot League-V4 and Match-V5 endpoints.
pub struct RiotApi {
    client: RateLimitedClient,
    league_base: String,
    match_base: String,
}

impl RiotApi {
    /// Build for a platform code; hosts are derived from it.
    pub fn new(client: RateLimitedClient, platform: &str) -> Self {
        Self::with_base_urls(
            client,
            config::platform_base_url(platform),
            config::region_base_url(platform),
        )
    }

    /// Build with explicit hosts (used to point at a mock server).
    pub fn with_base_urls(
        client: RateLimitedClient,
        league_base: impl Into<String>,
        match_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            league_base: league_base.into().trim_end_matches('/').to_string(),
            match_base: match_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn league_base(&self) -> &str {
        &self.league_base
    }

    pub fn match_base(&self) -> &str {
        &self.match_base
    }
}

impl LadderApi for RiotApi {
    fn top_leaderboard(&self, tier: Tier) -> FetchOutcome {
        let Some(path) = tier.leaderboard_path() else {
            return FetchOutcome::Failed(HarvestError::InvalidArgument(format!(
                "{tier} has no top leaderboard; use the paged entries endpoint"
            )));
        };
        let url = format!("{}/lol/league/v4/{}/by-queue/{}", self.league_base, path, QUEUE);
        self.client.get(&url, &[])
    }

    fn entries_page(&self, tier: Tier, division: Division, page: u32) -> FetchOutcome {
        if tier.is_apex() {
            return FetchOutcome::Failed(HarvestError::InvalidArgument(format!(
                "{tier} is not paginated; use the top leaderboard endpoint"
            )));
        }
        let url = format!(
            "{}/lol/league/v4/entries/{}/{}/{}",
            self.league_base, QUEUE, tier, division
        );
        self.client.get(&url, &[("page", page.to_string())])
    }

    fn recent_match_ids(&self, puuid: &str, count: u32) -> FetchOutcome {
        let url = format!("{}/lol/match/v5/matches/by-puuid/{}/ids", self.match_base, puuid);
        self.client
            .get(&url, &[("start", "0".to_string()), ("count", count.to_string())])
    }

    fn match_detail(&self, match_id: &str) -> FetchOutcome {
        let url = format!("{}/lol/match/v5/matches/{}", self.match_base, match_id);
        self.client.get(&url, &[])
    }
}
