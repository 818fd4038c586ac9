use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{HarvestError, Result};

pub const QUEUE: &str = "RANKED_SOLO_5x5";
pub const USER_AGENT: &str = concat!("ladder-harvest/", env!("CARGO_PKG_VERSION"));
pub const TOKEN_HEADER: &str = "X-Riot-Token";
pub const DEFAULT_PLATFORM: &str = "JP1";
pub const DEFAULT_REGION: &str = "asia";
pub const API_KEY_ENV: &str = "RIOT_API_KEY";

/// Regional routing value used by the match endpoints for a platform code.
pub fn region_for_platform(platform: &str) -> &'static str {
    match platform.to_ascii_uppercase().as_str() {
        "NA1" | "BR1" | "LA1" | "LA2" => "americas",
        "OC1" => "sea",
        "KR" | "JP1" => "asia",
        "EUN1" | "EUW1" | "TR1" | "RU" => "europe",
        _ => DEFAULT_REGION,
    }
}

pub fn platform_base_url(platform: &str) -> String {
    format!("https://{}.api.riotgames.com", platform.to_ascii_lowercase())
}

pub fn region_base_url(platform: &str) -> String {
    format!("https://{}.api.riotgames.com", region_for_platform(platform))
}

pub fn default_output_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("ladder-harvest")
    } else {
        PathBuf::from(".ladder-harvest")
    }
}

// ---------------------------------------------------------------------------
// HarvestConfig
// ---------------------------------------------------------------------------

/// Options recognized by a harvest run.
///
/// Every field has a default, so an empty JSON object is a valid config.
/// The `top_page` and `top_player` aliases accept the invocation-event
/// spelling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Pages fetched per (tier, division).
    #[serde(alias = "top_page")]
    pub pages_per_division: u32,
    /// Players selected from each page.
    #[serde(alias = "top_player")]
    pub top_per_page: usize,
    /// Platform code such as `JP1`, `EUW1` or `NA1`.
    pub platform: String,
    /// Recent matches fetched per selected player.
    pub recent_match_count: u32,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub request_timeout_secs: u64,
    pub page_pause_ms: u64,
    pub match_pause_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            pages_per_division: 3,
            top_per_page: 15,
            platform: DEFAULT_PLATFORM.to_string(),
            recent_match_count: 3,
            max_attempts: 4,
            backoff_base_ms: 1200,
            request_timeout_secs: 12,
            page_pause_ms: 250,
            match_pause_ms: 1250,
        }
    }
}

impl HarvestConfig {
    /// Parse a config from an invocation event such as
    /// `{"top_page": 2, "top_player": 10, "platform": "euw1"}`.
    ///
    /// Unknown keys are ignored. The platform is upper-cased.
    pub fn from_event(event: &serde_json::Value) -> Result<Self> {
        let config: HarvestConfig = serde_json::from_value(event.clone())?;
        config.normalized()
    }

    /// Upper-case the platform and reject values a run cannot work with.
    pub fn normalized(mut self) -> Result<Self> {
        self.platform = self.platform.trim().to_ascii_uppercase();
        if self.platform.is_empty() {
            return Err(HarvestError::InvalidArgument(
                "platform must not be empty".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(HarvestError::InvalidArgument(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    pub fn region(&self) -> &'static str {
        region_for_platform(&self.platform)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_pause(&self) -> Duration {
        Duration::from_millis(self.page_pause_ms)
    }

    pub fn match_pause(&self) -> Duration {
        Duration::from_millis(self.match_pause_ms)
    }
}
