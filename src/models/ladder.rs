use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Ranked tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    /// Every traversed tier, lowest first.
    pub const ALL: [Tier; 9] = [
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Emerald,
        Tier::Diamond,
        Tier::Master,
        Tier::Grandmaster,
        Tier::Challenger,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Emerald => "EMERALD",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
        }
    }

    /// Apex tiers have a single unpaginated leaderboard and no divisions.
    pub fn is_apex(self) -> bool {
        matches!(self, Tier::Master | Tier::Grandmaster | Tier::Challenger)
    }

    /// Divisions to walk for this tier; empty for apex tiers.
    pub fn divisions(self) -> &'static [Division] {
        if self.is_apex() {
            &[]
        } else {
            &Division::ALL
        }
    }

    /// Path segment of the apex leaderboard endpoint, e.g. `masterleagues`.
    pub fn leaderboard_path(self) -> Option<&'static str> {
        match self {
            Tier::Master => Some("masterleagues"),
            Tier::Grandmaster => Some("grandmasterleagues"),
            Tier::Challenger => Some("challengerleagues"),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Division
// ---------------------------------------------------------------------------

/// Division within a non-apex tier. `IV` is the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    #[serde(rename = "IV")]
    Four,
    #[serde(rename = "III")]
    Three,
    #[serde(rename = "II")]
    Two,
    #[serde(rename = "I")]
    One,
}

impl Division {
    /// Walk order, lowest first.
    pub const ALL: [Division; 4] = [Division::Four, Division::Three, Division::Two, Division::One];

    pub fn as_str(self) -> &'static str {
        match self {
            Division::Four => "IV",
            Division::Three => "III",
            Division::Two => "II",
            Division::One => "I",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LadderEntry
// ---------------------------------------------------------------------------

/// One player's placement on the ranked ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderEntry {
    pub puuid: String,
    pub tier: Tier,
    /// `None` for apex tiers.
    pub division: Option<Division>,
    pub league_points: i64,
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    pub hot_streak: Option<bool>,
    pub veteran: Option<bool>,
    pub fresh_blood: Option<bool>,
    pub inactive: Option<bool>,
}

/// Ladder extras of one league element. Any field may be missing or null.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLadderEntry {
    league_points: Option<i64>,
    wins: Option<u32>,
    losses: Option<u32>,
    hot_streak: Option<bool>,
    veteran: Option<bool>,
    fresh_blood: Option<bool>,
    inactive: Option<bool>,
}

impl LadderEntry {
    pub fn new(puuid: impl Into<String>, tier: Tier, division: Option<Division>, league_points: i64) -> Self {
        Self {
            puuid: puuid.into(),
            tier,
            division,
            league_points,
            wins: None,
            losses: None,
            hot_streak: None,
            veteran: None,
            fresh_blood: None,
            inactive: None,
        }
    }

    /// Build an entry from one element of a league payload.
    ///
    /// Returns `None` only when the element carries no non-empty `puuid`.
    /// A null `leaguePoints` reads as 0; extras that cannot be decoded are
    /// dropped rather than dropping the player.
    pub fn from_raw(raw: &Value, tier: Tier, division: Option<Division>) -> Option<Self> {
        let puuid = raw
            .get("puuid")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())?
            .to_string();
        let parsed = RawLadderEntry::deserialize(raw).unwrap_or_default();
        Some(Self {
            puuid,
            tier,
            division,
            league_points: parsed.league_points.unwrap_or(0),
            wins: parsed.wins,
            losses: parsed.losses,
            hot_streak: parsed.hot_streak,
            veteran: parsed.veteran,
            fresh_blood: parsed.fresh_blood,
            inactive: parsed.inactive,
        })
    }

    /// Division label used in storage keys; apex tiers report `I`.
    pub fn division_label(&self) -> &'static str {
        self.division.unwrap_or(Division::One).as_str()
    }

    /// First eight characters of the puuid, for logs and fallback names.
    pub fn short_id(&self) -> &str {
        match self.puuid.char_indices().nth(8) {
            Some((idx, _)) => &self.puuid[..idx],
            None => &self.puuid,
        }
    }
}
