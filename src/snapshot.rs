// src/snapshot.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::index::IndexId;

pub const DEFAULT_SNAPSHOT_PATH: &str = "previous_data.json";
pub const DEFAULT_MAX_SEEN_LINKS: usize = 500;

/// Last observed memberships plus announcement links already notified.
///
/// Files written before announcements were tracked only carry `sp500` and
/// `nasdaq100`; the remaining fields default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSnapshot {
    #[serde(default)]
    pub sp500: BTreeSet<String>,
    #[serde(default)]
    pub nasdaq100: BTreeSet<String>,
    /// RFC 3339 when written by this crate; older files may hold other formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check: Option<String>,
    #[serde(default)]
    pub press_releases_checked: Vec<String>,
}

impl MembershipSnapshot {
    pub fn members(&self, index: IndexId) -> &BTreeSet<String> {
        match index {
            IndexId::Sp500 => &self.sp500,
            IndexId::Nasdaq100 => &self.nasdaq100,
        }
    }

    pub fn set_members(&mut self, index: IndexId, members: BTreeSet<String>) {
        match index {
            IndexId::Sp500 => self.sp500 = members,
            IndexId::Nasdaq100 => self.nasdaq100 = members,
        }
    }

    /// True when no index has ever been recorded (first run).
    pub fn is_initial(&self) -> bool {
        self.sp500.is_empty() && self.nasdaq100.is_empty()
    }

    pub fn has_seen(&self, link: &str) -> bool {
        self.press_releases_checked.iter().any(|l| l == link)
    }

    /// Append links not yet recorded, then drop the oldest beyond `cap`.
    pub fn record_links<I, S>(&mut self, links: I, cap: usize)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for l in links {
            let l = l.into();
            if !self.has_seen(&l) {
                self.press_releases_checked.push(l);
            }
        }
        if self.press_releases_checked.len() > cap {
            let excess = self.press_releases_checked.len() - cap;
            self.press_releases_checked.drain(0..excess);
        }
    }
}

/// JSON file holding the single [`MembershipSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file yields the empty default; malformed JSON is an error.
    pub async fn load(&self) -> Result<MembershipSnapshot> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no snapshot yet");
                return Ok(MembershipSnapshot::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading snapshot {}", self.path.display()))
            }
        };
        if raw.trim().is_empty() {
            return Ok(MembershipSnapshot::default());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", self.path.display()))
    }

    /// Writes a sibling temp file and renames it over the snapshot.
    pub async fn save(&self, snapshot: &MembershipSnapshot) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(snapshot).context("serializing snapshot")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
