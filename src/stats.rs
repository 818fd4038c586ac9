//! Derivation of flat per-player statistics from a raw match payload.
//!
//! [`derive`] is pure: it reads one match-detail payload and the target
//! puuid and returns a [`DerivedStats`], or `None` when the payload cannot be
//! decoded or the player is not in the match.
//!
//! Several counters live at the top level of a participant in some payload
//! versions and only inside `challenges` in others. All of them go through
//! [`resolve_field`], which prefers the first *truthy* candidate: a zero
//! count, `false` or an empty string counts as missing and falls through to
//! the next candidate.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{Count, DerivedStats, Participant, RawMatch};

pub const UNKNOWN_POSITION: &str = "UNKNOWN";

/// Lower bound for game length in minutes, so per-minute rates never divide
/// by zero.
pub const MIN_GAME_MINUTES: f64 = 1.0 / 60.0;

// ---------------------------------------------------------------------------
// Field resolution
// ---------------------------------------------------------------------------

/// Values that have a "falsy" state which counts as missing data.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for i64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for Count {
    fn is_truthy(&self) -> bool {
        self.0 != 0
    }
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for &str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

/// Return `primary` if it is present and truthy, else the first truthy
/// fallback, else `default`.
pub fn resolve_field<T: Truthy>(primary: Option<T>, fallbacks: impl IntoIterator<Item = Option<T>>, default: T) -> T {
    std::iter::once(primary)
        .chain(fallbacks)
        .flatten()
        .find(|value| value.is_truthy())
        .unwrap_or(default)
}

fn count(value: Option<Count>) -> i64 {
    value.map(Count::get).unwrap_or(0)
}

fn resolve_count(primary: Option<Count>, fallbacks: impl IntoIterator<Item = Option<Count>>) -> i64 {
    resolve_field(primary, fallbacks, Count(0)).get()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Saturating sum of a per-participant value over one side of the match.
fn team_sum(side: &[&Participant], value: impl Fn(&Participant) -> i64) -> i64 {
    side.iter().fold(0i64, |acc, p| acc.saturating_add(value(*p)))
}

fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

// Per-participant objective resolution, shared by the player row and the
// team aggregates.

fn turret_takedowns(p: &Participant) -> i64 {
    resolve_count(p.turret_takedowns, [p.challenges().turret_takedowns])
}

fn dragon_kills(p: &Participant) -> i64 {
    let c = p.challenges();
    resolve_count(p.dragon_kills, [c.dragon_takedowns, c.dragon_kills])
}

fn baron_kills(p: &Participant) -> i64 {
    let c = p.challenges();
    resolve_count(p.baron_kills, [c.baron_takedowns, c.baron_kills])
}

fn team_position(p: &Participant) -> String {
    resolve_field(
        p.team_position.as_deref(),
        [p.individual_position.as_deref()],
        UNKNOWN_POSITION,
    )
    .to_string()
}

fn summoner_name(p: &Participant) -> Option<String> {
    p.summoner_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .or_else(|| p.riot_id_game_name.as_deref().filter(|n| !n.is_empty()))
        .map(|n| n.to_string())
}

// ---------------------------------------------------------------------------
// derive
// ---------------------------------------------------------------------------

/// Derive the statistics of `puuid` in one raw match payload.
///
/// Returns `None` if the payload is malformed, has no participants, or does
/// not include `puuid`. Never panics on bad input.
pub fn derive(raw: &Value, puuid: &str) -> Option<DerivedStats> {
    let parsed = match RawMatch::deserialize(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Error extracting player stats: {}", e);
            return None;
        }
    };
    derive_from(&parsed, puuid)
}

/// [`derive`] over an already decoded match.
pub fn derive_from(raw: &RawMatch, puuid: &str) -> Option<DerivedStats> {
    let participants = &raw.info.participants;
    let player = participants
        .iter()
        .find(|p| p.puuid.as_deref() == Some(puuid))?;

    let (team, enemies): (Vec<&Participant>, Vec<&Participant>) = participants
        .iter()
        .partition(|p| p.team_id == player.team_id);

    let team_total_kills = team_sum(&team, |p| count(p.kills));
    let team_total_damage = team_sum(&team, |p| count(p.total_damage_dealt_to_champions));
    let team_total_damage_taken = team_sum(&team, |p| count(p.total_damage_taken));
    let team_turret_takedowns = team_sum(&team, turret_takedowns);
    let team_dragon_kills = team_sum(&team, dragon_kills);
    let team_baron_kills = team_sum(&team, baron_kills);
    let enemy_total_kills = team_sum(&enemies, |p| count(p.kills));

    let kills = count(player.kills);
    let deaths = count(player.deaths);
    let assists = count(player.assists);
    let total_damage = count(player.total_damage_dealt_to_champions);
    let total_damage_taken = count(player.total_damage_taken);
    let gold_earned = count(player.gold_earned);
    let vision_score = count(player.vision_score);
    let time_ccing = player.time_ccing_others.filter(|t| t.is_finite()).unwrap_or(0.0);

    let game_duration = count(raw.info.game_duration);
    let minutes = (game_duration as f64 / 60.0).max(MIN_GAME_MINUTES);

    let takedowns = kills.saturating_add(assists);
    let kda = takedowns as f64 / deaths.max(1) as f64;
    let gold_per_minute = gold_earned as f64 / minutes;
    let damage_per_minute = total_damage as f64 / minutes;
    let vision_score_per_minute = vision_score as f64 / minutes;
    let team_damage_percentage = ratio(total_damage, team_total_damage) * 100.0;
    let damage_taken_on_team_percentage = ratio(total_damage_taken, team_total_damage_taken) * 100.0;
    let kill_participation = ratio(takedowns, team_total_kills);

    let c = player.challenges();

    Some(DerivedStats {
        match_id: raw.metadata.match_id.clone(),
        game_creation: raw.info.game_creation,
        game_duration,
        game_mode: raw.info.game_mode.clone(),
        queue_id: raw.info.queue_id,
        puuid: puuid.to_string(),
        summoner_name: summoner_name(player),

        champion_name: player.champion_name.clone(),
        team_position: team_position(player),
        win: player.win.unwrap_or(false),

        kills,
        deaths,
        assists,
        kda: round_to(kda, 3),
        total_damage_dealt_to_champions: total_damage,
        total_damage_taken,
        damage_per_minute: round_to(damage_per_minute, 2),
        damage_taken_on_team_percentage: round_to(damage_taken_on_team_percentage, 2),
        team_damage_percentage: round_to(team_damage_percentage, 2),
        kill_participation: round_to(kill_participation, 3),
        time_ccing_others: round_to(time_ccing, 2),

        gold_earned,
        gold_per_minute: round_to(gold_per_minute, 2),
        turret_takedowns: turret_takedowns(player),
        dragon_kills: dragon_kills(player),
        baron_kills: baron_kills(player),
        objective_stolen: resolve_count(
            player.objectives_stolen,
            [player.objective_stolen, c.objectives_stolen, c.objective_stolen],
        ),
        objective_stolen_assists: resolve_count(
            player.objectives_stolen_assists,
            [c.objectives_stolen_assists],
        ),

        vision_score,
        vision_score_per_minute: round_to(vision_score_per_minute, 3),
        wards_placed: resolve_count(player.wards_placed, [c.wards_placed]),
        wards_killed: resolve_count(player.wards_killed, [c.wards_killed]),

        total_minions_killed: count(player.total_minions_killed),
        neutral_minions_killed: count(player.neutral_minions_killed),
        lane_minions_first10_minutes: count(c.lane_minions_first10_minutes),

        kills_under_own_turret: resolve_count(player.kills_under_own_turret, [c.kills_under_own_turret]),
        kills_near_enemy_turret: resolve_count(
            player.kills_near_enemy_turret,
            [c.kills_near_enemy_turret],
        ),
        takedowns_before_jungle_minion_spawn: count(c.takedowns_before_jungle_minion_spawn),
        first_blood_kill: resolve_field(player.first_blood_kill, [c.first_blood_kill], false),
        first_tower_kill: resolve_field(player.first_tower_kill, [c.first_tower_kill], false),

        team_total_kills,
        team_total_damage,
        team_total_damage_taken,
        team_turret_takedowns,
        team_dragon_kills,
        team_baron_kills,
        enemy_total_kills,
    })
}
