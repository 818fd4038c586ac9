//! Shared test fixtures for the ladder harvest integration tests.
//!
//! Provides a recording [`Sleeper`], a scripted [`Transport`], an in-memory
//! [`LadderApi`] and builders for raw match and ladder payloads.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ladder_harvest::{
    Division, FetchOutcome, HarvestError, LadderApi, RawResponse, Result, Sleeper, Tier, Transport,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// RecordingSleeper
// ---------------------------------------------------------------------------

/// Records every requested sleep instead of waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// Replays canned responses in order and records requested URLs.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<RawResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn with_results(responses: Vec<Result<RawResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str, _params: &[(&str, String)]) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HarvestError::InvalidArgument(format!("no scripted response for {url}"))))
    }
}

// ---------------------------------------------------------------------------
// FakeApi
// ---------------------------------------------------------------------------

/// In-memory [`LadderApi`]. Unknown lookups are `NotFound`.
#[derive(Default)]
pub struct FakeApi {
    pub leaderboards: HashMap<Tier, Value>,
    pub pages: HashMap<(Tier, Division, u32), Value>,
    pub match_ids: HashMap<String, Value>,
    pub matches: HashMap<String, Value>,
    pub failing_pages: HashSet<(Tier, Division, u32)>,
    pub failing_matches: HashSet<String>,
    pub failing_match_id_lists: HashSet<String>,

    pub leaderboard_calls: RefCell<Vec<Tier>>,
    pub page_calls: RefCell<Vec<(Tier, Division, u32)>>,
    pub match_id_calls: RefCell<Vec<(String, u32)>>,
    pub match_calls: RefCell<Vec<String>>,
}

fn failure(what: &str) -> FetchOutcome {
    FetchOutcome::Failed(HarvestError::RetriesExhausted {
        url: what.to_string(),
        attempts: 4,
        status: 503,
    })
}

impl LadderApi for FakeApi {
    fn top_leaderboard(&self, tier: Tier) -> FetchOutcome {
        self.leaderboard_calls.borrow_mut().push(tier);
        match self.leaderboards.get(&tier) {
            Some(v) => FetchOutcome::Found(v.clone()),
            None => FetchOutcome::NotFound,
        }
    }

    fn entries_page(&self, tier: Tier, division: Division, page: u32) -> FetchOutcome {
        self.page_calls.borrow_mut().push((tier, division, page));
        if self.failing_pages.contains(&(tier, division, page)) {
            return failure("entries page");
        }
        match self.pages.get(&(tier, division, page)) {
            Some(v) => FetchOutcome::Found(v.clone()),
            None => FetchOutcome::NotFound,
        }
    }

    fn recent_match_ids(&self, puuid: &str, count: u32) -> FetchOutcome {
        self.match_id_calls.borrow_mut().push((puuid.to_string(), count));
        if self.failing_match_id_lists.contains(puuid) {
            return failure("match ids");
        }
        match self.match_ids.get(puuid) {
            Some(v) => FetchOutcome::Found(v.clone()),
            None => FetchOutcome::NotFound,
        }
    }

    fn match_detail(&self, match_id: &str) -> FetchOutcome {
        self.match_calls.borrow_mut().push(match_id.to_string());
        if self.failing_matches.contains(match_id) {
            return failure("match detail");
        }
        match self.matches.get(match_id) {
            Some(v) => FetchOutcome::Found(v.clone()),
            None => FetchOutcome::NotFound,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

/// Ladder entry as returned by the paged entries endpoint.
pub fn ladder_entry(puuid: &str, league_points: i64) -> Value {
    json!({
        "leagueId": "league-1",
        "queueType": "RANKED_SOLO_5x5",
        "puuid": puuid,
        "leaguePoints": league_points,
        "wins": 40,
        "losses": 35,
        "veteran": false,
        "inactive": false,
        "freshBlood": true,
        "hotStreak": false
    })
}

pub fn entries_page(puuids: &[&str]) -> Value {
    Value::Array(
        puuids
            .iter()
            .enumerate()
            .map(|(i, p)| ladder_entry(p, 90 - i as i64))
            .collect(),
    )
}

/// Apex leaderboard object wrapping its entries.
pub fn leaderboard(tier: &str, puuids: &[&str]) -> Value {
    json!({
        "tier": tier,
        "leagueId": "apex-league",
        "queue": "RANKED_SOLO_5x5",
        "name": "Apex",
        "entries": entries_page(puuids),
    })
}

/// Participant block with the combat counters set and everything else
/// neutral.
pub fn participant(puuid: &str, team_id: i64, kills: i64, deaths: i64, assists: i64) -> Value {
    json!({
        "puuid": puuid,
        "teamId": team_id,
        "summonerName": format!("name-{puuid}"),
        "championName": "Ahri",
        "teamPosition": "MIDDLE",
        "individualPosition": "MIDDLE",
        "win": team_id == 100,
        "kills": kills,
        "deaths": deaths,
        "assists": assists,
        "totalDamageDealtToChampions": 10000,
        "totalDamageTaken": 20000,
        "goldEarned": 12000,
        "visionScore": 30,
        "totalMinionsKilled": 180,
        "neutralMinionsKilled": 12,
        "timeCCingOthers": 25,
        "turretTakedowns": 1,
        "dragonKills": 0,
        "baronKills": 0,
        "wardsPlaced": 10,
        "wardsKilled": 3
    })
}

pub fn raw_match(match_id: &str, duration_secs: i64, participants: Vec<Value>) -> Value {
    json!({
        "metadata": { "matchId": match_id, "participants": [] },
        "info": {
            "gameCreation": 1_700_000_000_000i64,
            "gameDuration": duration_secs,
            "gameMode": "CLASSIC",
            "queueId": 420,
            "participants": participants
        }
    })
}

/// Ten-player match. `target` is on team 100 with 5/2/7; team 100 totals
/// 20 kills.
pub fn ten_player_match(match_id: &str, target: &str) -> Value {
    let mut participants = vec![participant(target, 100, 5, 2, 7)];
    for (i, kills) in [4, 3, 5, 3].into_iter().enumerate() {
        participants.push(participant(&format!("ally-{i}"), 100, kills, 3, 6));
    }
    for i in 0..5 {
        participants.push(participant(&format!("enemy-{i}"), 200, 2, 4, 3));
    }
    raw_match(match_id, 1800, participants)
}
