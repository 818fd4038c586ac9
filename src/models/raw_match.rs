use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Count: integer counter that also accepts whole-valued floats
// ---------------------------------------------------------------------------

/// Counter value from a participant block.
///
/// The `challenges` block reports some counters as floats (`2.0`), so any
/// JSON number is accepted and truncated toward zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Count(pub i64);

impl Count {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountVisitor;

        impl<'de> Visitor<'de> for CountVisitor {
            type Value = Count;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Count, E> {
                Ok(Count(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Count, E> {
                i64::try_from(v)
                    .map(Count)
                    .map_err(|_| E::custom(format!("counter {v} out of range")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Count, E> {
                if v.is_finite() {
                    Ok(Count(v.trunc() as i64))
                } else {
                    Err(E::custom("counter is not finite"))
                }
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}

// ---------------------------------------------------------------------------
// RawMatch: match-detail payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMatch {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchMetadata {
    pub match_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchInfo {
    pub game_creation: Option<i64>,
    /// Seconds.
    pub game_duration: Option<Count>,
    pub game_mode: Option<String>,
    pub queue_id: Option<i64>,
    pub participants: Vec<Participant>,
}

/// One player's raw stat block within a match.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub puuid: Option<String>,
    pub team_id: Option<i64>,
    pub summoner_name: Option<String>,
    pub riot_id_game_name: Option<String>,
    pub champion_name: Option<String>,
    pub team_position: Option<String>,
    pub individual_position: Option<String>,
    pub win: Option<bool>,

    pub kills: Option<Count>,
    pub deaths: Option<Count>,
    pub assists: Option<Count>,
    pub total_damage_dealt_to_champions: Option<Count>,
    pub total_damage_taken: Option<Count>,
    pub gold_earned: Option<Count>,
    pub vision_score: Option<Count>,
    pub total_minions_killed: Option<Count>,
    pub neutral_minions_killed: Option<Count>,
    #[serde(rename = "timeCCingOthers")]
    pub time_ccing_others: Option<f64>,

    pub turret_takedowns: Option<Count>,
    pub dragon_kills: Option<Count>,
    pub baron_kills: Option<Count>,
    pub objectives_stolen: Option<Count>,
    /// Singular spelling used by some payload versions.
    pub objective_stolen: Option<Count>,
    pub objectives_stolen_assists: Option<Count>,
    pub kills_under_own_turret: Option<Count>,
    pub kills_near_enemy_turret: Option<Count>,
    pub first_blood_kill: Option<bool>,
    pub first_tower_kill: Option<bool>,
    pub wards_placed: Option<Count>,
    pub wards_killed: Option<Count>,

    pub challenges: Option<Challenges>,
}

/// Supplementary counters the upstream source may or may not populate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Challenges {
    pub turret_takedowns: Option<Count>,
    pub dragon_takedowns: Option<Count>,
    pub dragon_kills: Option<Count>,
    pub baron_takedowns: Option<Count>,
    pub baron_kills: Option<Count>,
    pub objectives_stolen: Option<Count>,
    /// Singular spelling used by some payload versions.
    pub objective_stolen: Option<Count>,
    pub objectives_stolen_assists: Option<Count>,
    pub kills_under_own_turret: Option<Count>,
    pub kills_near_enemy_turret: Option<Count>,
    pub first_blood_kill: Option<bool>,
    pub first_tower_kill: Option<bool>,
    pub wards_placed: Option<Count>,
    pub wards_killed: Option<Count>,
    pub lane_minions_first10_minutes: Option<Count>,
    pub takedowns_before_jungle_minion_spawn: Option<Count>,
}

impl Participant {
    pub fn challenges(&self) -> &Challenges {
        static EMPTY: Challenges = Challenges {
            turret_takedowns: None,
            dragon_takedowns: None,
            dragon_kills: None,
            baron_takedowns: None,
            baron_kills: None,
            objectives_stolen: None,
            objective_stolen: None,
            objectives_stolen_assists: None,
            kills_under_own_turret: None,
            kills_near_enemy_turret: None,
            first_blood_kill: None,
            first_tower_kill: None,
            wards_placed: None,
            wards_killed: None,
            lane_minions_first10_minutes: None,
            takedowns_before_jungle_minion_spawn: None,
        };
        self.challenges.as_ref().unwrap_or(&EMPTY)
    }
}
