use serde::{Deserialize, Serialize};

use super::ladder::LadderEntry;

// ---------------------------------------------------------------------------
// DerivedStats: flat per-player, per-match record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    // -- match identity & meta --
    pub match_id: Option<String>,
    pub game_creation: Option<i64>,
    /// Seconds, as reported by the match payload.
    pub game_duration: i64,
    pub game_mode: Option<String>,
    pub queue_id: Option<i64>,
    pub puuid: String,
    pub summoner_name: Option<String>,

    // -- identity --
    pub champion_name: Option<String>,
    pub team_position: String,
    pub win: bool,

    // -- combat --
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub kda: f64,
    pub total_damage_dealt_to_champions: i64,
    pub total_damage_taken: i64,
    pub damage_per_minute: f64,
    pub damage_taken_on_team_percentage: f64,
    pub team_damage_percentage: f64,
    pub kill_participation: f64,
    #[serde(rename = "timeCCingOthers")]
    pub time_ccing_others: f64,

    // -- economy & objectives --
    pub gold_earned: i64,
    pub gold_per_minute: f64,
    pub turret_takedowns: i64,
    pub dragon_kills: i64,
    pub baron_kills: i64,
    pub objective_stolen: i64,
    pub objective_stolen_assists: i64,

    // -- vision --
    pub vision_score: i64,
    pub vision_score_per_minute: f64,
    pub wards_placed: i64,
    pub wards_killed: i64,

    // -- laning --
    pub total_minions_killed: i64,
    pub neutral_minions_killed: i64,
    pub lane_minions_first10_minutes: i64,

    // -- clutch --
    pub kills_under_own_turret: i64,
    pub kills_near_enemy_turret: i64,
    pub takedowns_before_jungle_minion_spawn: i64,
    pub first_blood_kill: bool,
    pub first_tower_kill: bool,

    // -- team context --
    pub team_total_kills: i64,
    pub team_total_damage: i64,
    pub team_total_damage_taken: i64,
    pub team_turret_takedowns: i64,
    pub team_dragon_kills: i64,
    pub team_baron_kills: i64,
    pub enemy_total_kills: i64,
}

// ---------------------------------------------------------------------------
// PlayerMatchSummary: unit written to storage
// ---------------------------------------------------------------------------

/// A ladder entry plus the derived stats of that player's recent matches,
/// in fetch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchSummary {
    pub entry: LadderEntry,
    pub recent_matches: Vec<DerivedStats>,
}

impl PlayerMatchSummary {
    pub fn new(entry: LadderEntry) -> Self {
        Self {
            entry,
            recent_matches: Vec::new(),
        }
    }

    /// Name used for the storage key.
    ///
    /// First non-empty summoner name among the records, else the first
    /// record's champion, else the short puuid. `/` is replaced by `_`.
    pub fn display_name(&self) -> String {
        let name = self
            .recent_matches
            .iter()
            .filter_map(|m| m.summoner_name.as_deref())
            .find(|n| !n.is_empty())
            .or_else(|| {
                self.recent_matches
                    .first()
                    .and_then(|m| m.champion_name.as_deref())
                    .filter(|n| !n.is_empty())
            })
            .unwrap_or_else(|| self.entry.short_id());
        name.replace('/', "_")
    }
}
