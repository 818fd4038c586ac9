//! Per-player match collection.
//!
//! For each selected player the collector fetches the most recent match ids,
//! then every match payload, and derives the player's statistics from each.
//! Failures stay inside the player: the summary keeps whatever records were
//! derived before the error.

use serde_json::Value;

use crate::api::LadderApi;
use crate::error::{HarvestError, Result};
use crate::models::{LadderEntry, PlayerMatchSummary};
use crate::pacing::Pacer;
use crate::stats;

pub struct MatchCollector<'a, A: LadderApi + ?Sized> {
    api: &'a A,
    recent_match_count: u32,
    pacer: Pacer,
    processed_matches: usize,
}

impl<'a, A: LadderApi + ?Sized> MatchCollector<'a, A> {
    pub fn new(api: &'a A, recent_match_count: u32, pacer: Pacer) -> Self {
        Self {
            api,
            recent_match_count,
            pacer,
            processed_matches: 0,
        }
    }

    /// Derived records produced so far across all players.
    pub fn processed_matches(&self) -> usize {
        self.processed_matches
    }

    /// Collect the recent matches of one ladder entry.
    ///
    /// Never fails: an error ends this player's collection early and is
    /// logged, and the partial summary is returned.
    pub fn collect(&mut self, entry: LadderEntry) -> PlayerMatchSummary {
        let mut summary = PlayerMatchSummary::new(entry);
        if let Err(e) = self.collect_into(&mut summary) {
            tracing::warn!(
                "Error fetching matches for {}: {} (kept {} records)",
                summary.entry.puuid,
                e,
                summary.recent_matches.len()
            );
        }
        summary
    }

    fn collect_into(&mut self, summary: &mut PlayerMatchSummary) -> Result<()> {
        let puuid = summary.entry.puuid.clone();
        let match_ids = self.recent_match_ids(&puuid)?;
        tracing::info!(
            "{}... -> matches found: {}",
            summary.entry.short_id(),
            match_ids.len()
        );

        for (i, match_id) in match_ids.iter().enumerate() {
            tracing::debug!("Processing match {}/{}: {}", i + 1, match_ids.len(), match_id);
            let outcome = self.api.match_detail(match_id);
            self.pacer.pause();

            let Some(raw) = outcome.into_result()? else {
                tracing::info!("match {} not found -> skipping", match_id);
                continue;
            };

            if let Some(stats) = stats::derive(&raw, &puuid) {
                self.processed_matches += 1;
                summary.recent_matches.push(stats);
            }
        }
        Ok(())
    }

    fn recent_match_ids(&self, puuid: &str) -> Result<Vec<String>> {
        let payload = self
            .api
            .recent_match_ids(puuid, self.recent_match_count)
            .into_result()?;
        let ids = match payload {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(HarvestError::MalformedPayload(format!(
                    "match id list for {puuid} is not an array: {other}"
                )))
            }
        };
        Ok(ids
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .take(self.recent_match_count as usize)
            .collect())
    }
}
