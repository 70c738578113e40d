// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::index::IndexId;

/// Unmatched entry from a feed or listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub source: String,
    pub title: String,
    pub link: String,
    pub date: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        })
    }
}

/// Press release or news item tied to a tracked index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub source: String,
    pub title: String,
    pub link: String,
    pub date: Option<String>,
    pub confidence: Confidence,
    pub index: IndexId,
}

#[async_trait::async_trait]
pub trait MembershipProvider: Send + Sync {
    async fn fetch_members(&self) -> Result<BTreeSet<String>>;
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
pub trait AnnouncementProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>>;
    fn name(&self) -> &str;
}
