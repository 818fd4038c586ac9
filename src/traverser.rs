//! Lazy walk over the ranked ladder.
//!
//! The page space is `tiers x divisions(tier) x 1..=pages`. Apex tiers
//! collapse to a single leaderboard call each. From every page up to
//! `top_per_page` entries are selected in list order, skipping players
//! already selected earlier in the same traversal.

use std::collections::{HashSet, VecDeque};

use serde_json::Value;

use crate::api::LadderApi;
use crate::error::Result;
use crate::models::{Division, LadderEntry, Tier};
use crate::pacing::Pacer;

// ---------------------------------------------------------------------------
// PageRef
// ---------------------------------------------------------------------------

/// One fetch in the traversal plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRef {
    pub tier: Tier,
    /// `None` for the apex leaderboard fetch.
    pub division: Option<Division>,
    pub page: u32,
}

impl PageRef {
    pub fn is_leaderboard(&self) -> bool {
        self.division.is_none()
    }
}

/// Every fetch the traversal performs, in order.
///
/// Apex tiers contribute exactly one leaderboard fetch regardless of
/// `pages_per_division`.
pub fn page_plan(tiers: &[Tier], pages_per_division: u32) -> Vec<PageRef> {
    let mut plan = Vec::new();
    for &tier in tiers {
        if tier.is_apex() {
            plan.push(PageRef {
                tier,
                division: None,
                page: 1,
            });
            continue;
        }
        for &division in tier.divisions() {
            for page in 1..=pages_per_division {
                plan.push(PageRef {
                    tier,
                    division: Some(division),
                    page,
                });
            }
        }
    }
    plan
}

/// Entry list inside a page payload, or `None` if the payload is not
/// list-shaped. Apex leaderboards wrap the list in an `entries` field.
fn entry_list<'a>(payload: &'a Value, page: &PageRef) -> Option<&'a Vec<Value>> {
    if page.is_leaderboard() {
        if let Some(arr) = payload.get("entries").and_then(Value::as_array) {
            return Some(arr);
        }
    }
    payload.as_array()
}

// ---------------------------------------------------------------------------
// LeaderboardTraverser
// ---------------------------------------------------------------------------

/// Iterator over the selected [`LadderEntry`] values of one traversal run.
///
/// Owns the set of already selected puuids for the lifetime of the run. A
/// failed page fetch is yielded once as `Err` and ends the iteration;
/// malformed pages are skipped with a warning.
pub struct LeaderboardTraverser<'a, A: LadderApi + ?Sized> {
    api: &'a A,
    top_per_page: usize,
    pacer: Pacer,
    plan: std::vec::IntoIter<PageRef>,
    pending: VecDeque<LadderEntry>,
    seen: HashSet<String>,
    pages_fetched: usize,
    pages_skipped: usize,
    finished: bool,
}

impl<'a, A: LadderApi + ?Sized> LeaderboardTraverser<'a, A> {
    /// Traverse every tier in [`Tier::ALL`].
    pub fn new(api: &'a A, pages_per_division: u32, top_per_page: usize, pacer: Pacer) -> Self {
        Self::with_tiers(api, &Tier::ALL, pages_per_division, top_per_page, pacer)
    }

    /// Traverse only `tiers`, in the given order.
    pub fn with_tiers(
        api: &'a A,
        tiers: &[Tier],
        pages_per_division: u32,
        top_per_page: usize,
        pacer: Pacer,
    ) -> Self {
        Self {
            api,
            top_per_page,
            pacer,
            plan: page_plan(tiers, pages_per_division).into_iter(),
            pending: VecDeque::new(),
            seen: HashSet::new(),
            pages_fetched: 0,
            pages_skipped: 0,
            finished: false,
        }
    }

    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    /// Consume the traverser, returning the puuids selected so far.
    pub fn into_seen(self) -> HashSet<String> {
        self.seen
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Pages dropped for a malformed payload.
    pub fn pages_skipped(&self) -> usize {
        self.pages_skipped
    }

    fn fetch_page(&mut self, page: PageRef) -> Result<Vec<LadderEntry>> {
        let label = page.division.map(Division::as_str).unwrap_or("(leaderboard)");
        tracing::info!("Fetching entries page {} for {} {}...", page.page, page.tier, label);

        let outcome = match page.division {
            None => self.api.top_leaderboard(page.tier),
            Some(division) => self.api.entries_page(page.tier, division, page.page),
        };
        self.pacer.pause();
        self.pages_fetched += 1;

        let Some(payload) = outcome.into_result()? else {
            tracing::debug!("No entries for {} {} page {}", page.tier, label, page.page);
            return Ok(Vec::new());
        };

        let Some(raw_entries) = entry_list(&payload, &page) else {
            tracing::warn!(
                "Unexpected response for {} {} page {}: {} - skipping",
                page.tier,
                label,
                page.page,
                json_kind(&payload)
            );
            self.pages_skipped += 1;
            return Ok(Vec::new());
        };

        let selected = self.select(raw_entries, &page);
        tracing::info!(" -> selected {} top entries from page {}", selected.len(), page.page);
        Ok(selected)
    }

    fn select(&mut self, raw_entries: &[Value], page: &PageRef) -> Vec<LadderEntry> {
        let mut selected = Vec::new();
        for raw in raw_entries {
            if selected.len() >= self.top_per_page {
                break;
            }
            let Some(entry) = LadderEntry::from_raw(raw, page.tier, page.division) else {
                tracing::debug!("Entry without puuid on {} page {}; skipping", page.tier, page.page);
                continue;
            };
            if !self.seen.insert(entry.puuid.clone()) {
                continue;
            }
            selected.push(entry);
        }
        selected
    }
}

impl<A: LadderApi + ?Sized> Iterator for LeaderboardTraverser<'_, A> {
    type Item = Result<LadderEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.pending.pop_front() {
                return Some(Ok(entry));
            }
            if self.finished {
                return None;
            }
            let Some(page) = self.plan.next() else {
                self.finished = true;
                return None;
            };
            match self.fetch_page(page) {
                Ok(entries) => self.pending.extend(entries),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
