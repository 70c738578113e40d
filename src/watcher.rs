// src/watcher.rs
//! One batch run: fetch → load snapshot → diff → notify → save snapshot.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeSet;

use crate::config::WatchConfig;
use crate::diff::IndexDiff;
use crate::index::IndexId;
use crate::ingest::providers::{
    announcement_providers_from_config, membership_providers_from_config,
};
use crate::ingest::types::{Announcement, AnnouncementProvider, Confidence, MembershipProvider};
use crate::ingest::{collect_announcements, collect_members, http_client};
use crate::notify::{message, Notification, NotifierMux, Priority};
use crate::snapshot::{MembershipSnapshot, SnapshotStore, DEFAULT_MAX_SEEN_LINKS};

/// What a run observed and did.
#[derive(Debug, Default)]
pub struct RunReport {
    /// No prior snapshot: state was recorded without diffing.
    pub initialized: bool,
    /// Only indexes that were diffed (not skipped), in tracking order.
    pub diffs: Vec<(IndexId, IndexDiff)>,
    /// Indexes left untouched because their fetch came back empty.
    pub skipped: Vec<IndexId>,
    /// Indexes recorded without a diff because no membership was stored yet.
    pub reinitialized: Vec<IndexId>,
    pub new_announcements: Vec<Announcement>,
    pub saved: bool,
    /// Notifications accepted by at least one channel.
    pub delivered: usize,
}

impl RunReport {
    pub fn changed(&self) -> bool {
        self.diffs.iter().any(|(_, d)| d.changed())
    }
}

pub struct Watcher {
    members: Vec<(IndexId, Box<dyn MembershipProvider>)>,
    announcements: Vec<Box<dyn AnnouncementProvider>>,
    keywords: Vec<(IndexId, Vec<String>)>,
    store: SnapshotStore,
    notifier: NotifierMux,
    guard_empty_fetch: bool,
    max_seen_links: usize,
}

impl Watcher {
    pub fn new(
        members: Vec<(IndexId, Box<dyn MembershipProvider>)>,
        store: SnapshotStore,
        notifier: NotifierMux,
    ) -> Self {
        Self {
            members,
            announcements: Vec::new(),
            keywords: Vec::new(),
            store,
            notifier,
            guard_empty_fetch: false,
            max_seen_links: DEFAULT_MAX_SEEN_LINKS,
        }
    }

    pub fn with_announcements(
        mut self,
        providers: Vec<Box<dyn AnnouncementProvider>>,
        keywords: Vec<(IndexId, Vec<String>)>,
    ) -> Self {
        self.announcements = providers;
        self.keywords = keywords;
        self
    }

    pub fn with_empty_fetch_guard(mut self, on: bool) -> Self {
        self.guard_empty_fetch = on;
        self
    }

    pub fn with_max_seen_links(mut self, cap: usize) -> Self {
        self.max_seen_links = cap.max(1);
        self
    }

    /// Wires HTTP providers and env-configured channels.
    pub fn from_config(cfg: &WatchConfig) -> Result<Self> {
        let client = http_client(&cfg.user_agent, cfg.http_timeout_secs)?;
        let members = membership_providers_from_config(cfg, &client);
        let feeds = announcement_providers_from_config(cfg, &client);
        let notifier = NotifierMux::from_env(cfg, &client);

        Ok(Self::new(members, SnapshotStore::new(cfg.snapshot_path.clone()), notifier)
            .with_announcements(feeds, cfg.keywords())
            .with_empty_fetch_guard(cfg.guard_empty_fetch)
            .with_max_seen_links(cfg.max_seen_links))
    }

    pub async fn run_once(&self) -> Result<RunReport> {
        self.run_once_at(Utc::now()).await
    }

    /// Fails only when the snapshot cannot be read; fetch and delivery
    /// failures are logged and the run continues.
    pub async fn run_once_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        tracing::info!(at = %now.to_rfc3339(), "index check started");

        let mut current: Vec<(IndexId, BTreeSet<String>)> = Vec::with_capacity(self.members.len());
        for (id, p) in &self.members {
            let set = collect_members(p.as_ref()).await;
            tracing::info!(index = %id, count = set.len(), "fetched membership");
            current.push((*id, set));
        }
        let announcements = collect_announcements(&self.announcements, &self.keywords).await;

        let previous = self.store.load().await?;
        let mut report = RunReport::default();
        let stamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);

        if previous.is_initial() {
            tracing::info!("no previous snapshot; recording initial state");
            let mut next = MembershipSnapshot {
                last_check: Some(stamp),
                ..Default::default()
            };
            for (id, set) in &current {
                next.set_members(*id, set.clone());
            }
            next.record_links(announcements.iter().map(|a| a.link.clone()), self.max_seen_links);

            report.initialized = true;
            report.saved = self.save(&next).await;

            let counts: Vec<(IndexId, usize)> =
                current.iter().map(|(id, s)| (*id, s.len())).collect();
            let n = Notification::new(message::initialized(&counts, now), Priority::Normal);
            if self.notifier.notify(&n).await {
                report.delivered += 1;
            }
            return Ok(report);
        }

        let mut next = previous.clone();
        for (id, set) in current {
            if self.guard_empty_fetch {
                if set.is_empty() {
                    tracing::warn!(index = %id, "empty fetch; keeping previous membership");
                    report.skipped.push(id);
                    continue;
                }
                if previous.members(id).is_empty() {
                    tracing::info!(index = %id, count = set.len(), "no stored membership; recording without diff");
                    next.set_members(id, set);
                    report.reinitialized.push(id);
                    continue;
                }
            }
            let diff = IndexDiff::compute(previous.members(id), &set);
            if diff.changed() {
                tracing::info!(
                    index = %id,
                    added = diff.added.len(),
                    removed = diff.removed.len(),
                    "membership changed"
                );
                let n = Notification::new(message::index_change(id, &diff, now), Priority::High);
                if self.notifier.notify(&n).await {
                    report.delivered += 1;
                }
            } else {
                tracing::info!(index = %id, "no change");
            }
            next.set_members(id, set);
            report.diffs.push((id, diff));
        }

        for a in announcements.into_iter().filter(|a| !previous.has_seen(&a.link)) {
            tracing::info!(source = %a.source, confidence = %a.confidence, link = %a.link, "new announcement");
            let priority = if a.confidence == Confidence::High {
                Priority::High
            } else {
                Priority::Normal
            };
            if self
                .notifier
                .notify(&Notification::new(message::announcement(&a), priority))
                .await
            {
                report.delivered += 1;
            }
            report.new_announcements.push(a);
        }

        if report.changed()
            || !report.reinitialized.is_empty()
            || !report.new_announcements.is_empty()
        {
            next.last_check = Some(stamp);
            next.record_links(
                report.new_announcements.iter().map(|a| a.link.clone()),
                self.max_seen_links,
            );
            report.saved = self.save(&next).await;
            if report.saved {
                tracing::info!(path = %self.store.path().display(), "snapshot saved");
            }
        }

        tracing::info!("index check finished");
        Ok(report)
    }

    async fn save(&self, snap: &MembershipSnapshot) -> bool {
        match self.store.save(snap).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = ?e, "saving snapshot failed");
                false
            }
        }
    }
}
