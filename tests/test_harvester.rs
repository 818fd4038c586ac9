//! End-to-end harvest runs: against the in-memory API, and over HTTP
//! against a mock server.

mod common;

use std::time::Duration;

use common::{FakeApi, RecordingSleeper, ScriptedTransport};
use ladder_harvest::{
    Division, EnvCredentials, FsSink, Harvester, MemorySink, PlayerMatchSummary, StaticCredentials,
    StorageSink, Tier,
};
use mockito::{Matcher, Server};
use serde_json::json;

fn harvester(tiers: &[Tier], pages: u32, top: usize) -> Harvester {
    Harvester::builder()
        .pages_per_division(pages)
        .top_per_page(top)
        .credentials(StaticCredentials::new("test-key"))
        .sleeper(RecordingSleeper::new())
        .tiers(tiers)
        .build()
        .unwrap()
}

fn add_player(api: &mut FakeApi, puuid: &str, match_ids: &[&str]) {
    api.match_ids.insert(puuid.to_string(), json!(match_ids));
    for id in match_ids {
        api.matches.insert(id.to_string(), common::ten_player_match(id, puuid));
    }
}

/// Sink that refuses one key.
struct FlakySink {
    inner: MemorySink,
    refuse: String,
}

impl StorageSink for FlakySink {
    fn put(&mut self, key: &str, summary: &PlayerMatchSummary) -> ladder_harvest::Result<()> {
        if key == self.refuse {
            return Err(ladder_harvest::HarvestError::InvalidArgument("disk full".into()));
        }
        self.inner.put(key, summary)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[test]
fn builder_normalizes_config() {
    let h = Harvester::builder().platform("euw1").build().unwrap();
    assert_eq!(h.config().platform, "EUW1");
    assert_eq!(h.config().region(), "europe");
    assert_eq!(h.tiers().len(), 9);
    assert!(h.to_string().contains("platform=EUW1"));
}

#[test]
fn builder_rejects_empty_platform() {
    assert!(Harvester::builder().platform("  ").build().is_err());
}

// ---------------------------------------------------------------------------
// run_with
// ---------------------------------------------------------------------------

#[test]
fn run_stores_one_summary_per_selected_player() {
    let mut api = FakeApi::default();
    api.pages.insert((Tier::Gold, Division::Four, 1), common::entries_page(&["p1", "p2"]));
    api.leaderboards.insert(Tier::Challenger, common::leaderboard("CHALLENGER", &["c1"]));
    add_player(&mut api, "p1", &["JP1_1", "JP1_2"]);
    add_player(&mut api, "c1", &["JP1_3"]);

    let h = harvester(&[Tier::Gold, Tier::Challenger], 1, 15);
    let mut sink = MemorySink::new();
    let report = h.run_with(&api, &mut sink);

    assert!(report.is_success());
    assert_eq!(report.status_code, 200);
    assert_eq!(report.matches_processed, 3);
    assert_eq!(report.players_stored, 3);
    assert_eq!(
        report.message,
        "Successfully processed 3 matches and stored 3 player summaries."
    );
    assert_eq!(
        sink.keys(),
        vec![
            "match-history/GOLD/IV/90/name-p1.json",
            // p2 has no matches: the name falls back to the short puuid
            "match-history/GOLD/IV/89/p2.json",
            "match-history/CHALLENGER/I/90/name-c1.json",
        ]
    );
    let stored = sink.get("match-history/GOLD/IV/90/name-p1.json").unwrap();
    assert_eq!(stored.recent_matches.len(), 2);
}

#[test]
fn fatal_page_failure_reports_500_and_keeps_written_summaries() {
    let mut api = FakeApi::default();
    api.pages.insert((Tier::Gold, Division::Four, 1), common::entries_page(&["p1"]));
    api.failing_pages.insert((Tier::Gold, Division::Three, 1));
    api.pages.insert((Tier::Gold, Division::Two, 1), common::entries_page(&["p2"]));
    add_player(&mut api, "p1", &["JP1_1"]);

    let h = harvester(&[Tier::Gold], 1, 15);
    let mut sink = MemorySink::new();
    let report = h.run_with(&api, &mut sink);

    assert_eq!(report.status_code, 500);
    assert!(!report.is_success());
    assert!(report.message.contains("entries page"));
    assert_eq!(report.players_stored, 1);
    assert_eq!(report.matches_processed, 1);
    assert_eq!(sink.items.len(), 1);
}

#[test]
fn player_errors_do_not_abort_the_run() {
    let mut api = FakeApi::default();
    api.pages.insert((Tier::Bronze, Division::Four, 1), common::entries_page(&["p1", "p2"]));
    add_player(&mut api, "p1", &["JP1_1", "JP1_2"]);
    api.failing_matches.insert("JP1_2".into());
    add_player(&mut api, "p2", &["JP1_3"]);

    let h = harvester(&[Tier::Bronze], 1, 15);
    let mut sink = MemorySink::new();
    let report = h.run_with(&api, &mut sink);

    assert!(report.is_success());
    assert_eq!(report.players_stored, 2);
    assert_eq!(report.matches_processed, 2);
}

#[test]
fn sink_failures_are_skipped() {
    let mut api = FakeApi::default();
    api.pages.insert((Tier::Gold, Division::Four, 1), common::entries_page(&["p1", "p2"]));

    let h = harvester(&[Tier::Gold], 1, 15);
    let mut sink = FlakySink {
        inner: MemorySink::new(),
        refuse: "match-history/GOLD/IV/90/p1.json".into(),
    };
    let report = h.run_with(&api, &mut sink);

    assert!(report.is_success());
    assert_eq!(report.players_stored, 1);
    assert_eq!(sink.inner.keys(), vec!["match-history/GOLD/IV/89/p2.json"]);
}

#[test]
fn run_pauses_between_pages_and_matches() {
    let mut api = FakeApi::default();
    api.leaderboards.insert(Tier::Master, common::leaderboard("MASTER", &["m1"]));
    add_player(&mut api, "m1", &["JP1_1", "JP1_2"]);

    let sleeper = RecordingSleeper::new();
    let h = Harvester::builder()
        .credentials(StaticCredentials::new("k"))
        .sleeper(sleeper.clone())
        .tiers(&[Tier::Master])
        .build()
        .unwrap();
    h.run_with(&api, &mut MemorySink::new());

    assert_eq!(
        sleeper.recorded(),
        vec![
            Duration::from_millis(250),
            Duration::from_millis(1250),
            Duration::from_millis(1250),
        ]
    );
}

// ---------------------------------------------------------------------------
// run (credentials + HTTP)
// ---------------------------------------------------------------------------

#[test]
fn missing_credentials_fail_before_any_request() {
    let transport = ScriptedTransport::new(vec![]);
    let h = Harvester::builder()
        .credentials(EnvCredentials::new("LADDER_HARVEST_TEST_UNSET_KEY"))
        .transport(transport.clone())
        .sleeper(RecordingSleeper::new())
        .build()
        .unwrap();

    let mut sink = MemorySink::new();
    let report = h.run(&mut sink);
    assert_eq!(report.status_code, 500);
    assert_eq!(report.message, "Failed to retrieve API key");
    assert_eq!(report.players_stored, 0);
    assert_eq!(transport.call_count(), 0);
    assert!(sink.items.is_empty());
}

#[test]
fn full_run_over_http() {
    let mut server = Server::new();
    let leaderboard = server
        .mock("GET", "/lol/league/v4/challengerleagues/by-queue/RANKED_SOLO_5x5")
        .match_header("x-riot-token", "live-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(common::leaderboard("CHALLENGER", &["c1", "c2"]).to_string())
        .expect(1)
        .create();
    let ids_c1 = server
        .mock("GET", "/lol/match/v5/matches/by-puuid/c1/ids")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start".into(), "0".into()),
            Matcher::UrlEncoded("count".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(r#"["JP1_1", "JP1_2"]"#)
        .create();
    let _ids_c2 = server
        .mock("GET", "/lol/match/v5/matches/by-puuid/c2/ids")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"status": {"status_code": 404}}"#)
        .create();
    let _m1 = server
        .mock("GET", "/lol/match/v5/matches/JP1_1")
        .with_status(200)
        .with_body(common::ten_player_match("JP1_1", "c1").to_string())
        .create();
    let _m2 = server
        .mock("GET", "/lol/match/v5/matches/JP1_2")
        .with_status(404)
        .create();

    let h = Harvester::builder()
        .recent_match_count(2)
        .credentials(StaticCredentials::new("live-key"))
        .sleeper(RecordingSleeper::new())
        .base_urls(server.url(), server.url())
        .tiers(&[Tier::Challenger])
        .build()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut sink = FsSink::new(dir.path()).unwrap();
    let report = h.run(&mut sink);

    assert!(report.is_success(), "{}", report.message);
    assert_eq!(report.matches_processed, 1);
    assert_eq!(report.players_stored, 2);
    leaderboard.assert();
    ids_c1.assert();

    let path = dir.path().join("match-history/CHALLENGER/I/90/name-c1.json");
    let stored: PlayerMatchSummary =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(stored.entry.puuid, "c1");
    assert_eq!(stored.recent_matches.len(), 1);
    assert!(dir.path().join("match-history/CHALLENGER/I/89/c2.json").exists());
}

#[cfg(feature = "async")]
#[tokio::test]
async fn async_harvester_returns_report_and_sink() {
    let h = Harvester::builder()
        .credentials(EnvCredentials::new("LADDER_HARVEST_TEST_UNSET_KEY"))
        .sleeper(RecordingSleeper::new())
        .build()
        .unwrap();
    let harvester = ladder_harvest::AsyncHarvester::new(h);
    assert_eq!(harvester.harvester().config().platform, "JP1");
    let (report, sink) = harvester.run(MemorySink::new()).await.unwrap();
    assert_eq!(report.status_code, 500);
    assert!(sink.items.is_empty());
}
