//! Storage of per-player summaries.
//!
//! Summaries are addressed by a hierarchical key,
//! `match-history/{tier}/{division}/{league_points}/{name}.json`, and each
//! write is independent of the others.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{HarvestError, Result};
use crate::models::PlayerMatchSummary;

pub const KEY_PREFIX: &str = "match-history";

/// Storage key for a summary.
pub fn storage_key(summary: &PlayerMatchSummary) -> String {
    format!(
        "{}/{}/{}/{}/{}.json",
        KEY_PREFIX,
        summary.entry.tier,
        summary.entry.division_label(),
        summary.entry.league_points,
        summary.display_name()
    )
}

/// Destination for harvested summaries.
pub trait StorageSink {
    fn put(&mut self, key: &str, summary: &PlayerMatchSummary) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FsSink
// ---------------------------------------------------------------------------

/// Writes each summary as pretty-printed JSON at `root/key`.
///
/// Files are written to a temp file in the target directory and renamed
/// into place, so a crash never leaves a truncated summary behind.
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    /// Create the sink, creating `root` if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a key. Rejects keys that would escape the root.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for part in key.split('/') {
            if part.is_empty() || part == "." || part == ".." {
                return Err(HarvestError::InvalidArgument(format!(
                    "storage key '{key}' has an invalid segment"
                )));
            }
            path.push(part);
        }
        Ok(path)
    }
}

impl StorageSink for FsSink {
    fn put(&mut self, key: &str, summary: &PlayerMatchSummary) -> Result<()> {
        let dest = self.path_for(key)?;
        let parent = dest.parent().unwrap_or(&self.root).to_path_buf();
        fs::create_dir_all(&parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        serde_json::to_writer_pretty(&mut tmp, summary)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&dest).map_err(|e| HarvestError::Io(e.error))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Keeps summaries in memory, in write order. Used for dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub items: Vec<(String, PlayerMatchSummary)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.items.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&PlayerMatchSummary> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }
}

impl StorageSink for MemorySink {
    fn put(&mut self, key: &str, summary: &PlayerMatchSummary) -> Result<()> {
        self.items.push((key.to_string(), summary.clone()));
        Ok(())
    }
}
