// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::index::IndexId;
use crate::ingest::types::{
    Announcement, AnnouncementProvider, Confidence, MembershipProvider, RawItem,
};
use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

fn describe_metrics() {
    describe_counter!(
        "members_fetched_total",
        "Ticker symbols returned by membership providers."
    );
    describe_counter!(
        "announcements_matched_total",
        "Feed items tied to a tracked index."
    );
    describe_counter!("fetch_errors_total", "Provider fetch/parse errors.");
    describe_counter!(
        "notify_failures_total",
        "Notification deliveries rejected by a channel."
    );
    describe_histogram!("parse_ms", "Provider parse time in milliseconds.");
}

/// One-time metrics registration.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_metrics);
}

/// Shared HTTP client with per-request timeout.
pub fn http_client(user_agent: &str, timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
        .context("building http client")
}

/// GET `url` and return the body; non-2xx is an error.
pub(crate) async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {status} for {url}");
    }
    resp.text()
        .await
        .with_context(|| format!("reading body of {url}"))
}

/// Normalize text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Clean a table cell into a ticker: drop footnote markers like `[1]`,
/// trim, and reject empty or multi-word cells.
pub fn normalize_symbol(cell: &str) -> Option<String> {
    static RE_NOTE: OnceCell<Regex> = OnceCell::new();
    let re_note = RE_NOTE.get_or_init(|| Regex::new(r"\[[^\]]*\]").unwrap());
    let s = re_note.replace_all(cell, "");
    let s = s.trim();
    if s.is_empty() || s.contains(char::is_whitespace) {
        return None;
    }
    Some(s.to_string())
}

fn change_phrase() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(set to join|to join|will join|joins|to replace|will replace|replacing|replaces|added to|to be added|removed from|to be removed|will be removed|deleted from|reconstitut\w*)\b",
        )
        .unwrap()
    })
}

fn mentions(text: &str, keywords: &[String]) -> bool {
    let hay = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .any(|k| hay.contains(&k.trim().to_lowercase()))
}

/// Tie a raw item to a tracked index. Titles are checked across every
/// index before any summary, so a title match always wins over an earlier
/// index named only in the summary. Items mentioning no tracked index yield
/// `None`.
pub fn match_announcement(
    item: &RawItem,
    keywords: &[(IndexId, Vec<String>)],
) -> Option<Announcement> {
    let title = normalize_text(&item.title);
    let summary = item.summary.as_deref().map(normalize_text).unwrap_or_default();

    let (index, confidence) = if let Some((index, _)) =
        keywords.iter().find(|(_, kws)| mentions(&title, kws))
    {
        let confidence = if change_phrase().is_match(&title) {
            Confidence::High
        } else {
            Confidence::Medium
        };
        (*index, confidence)
    } else {
        let (index, _) = keywords.iter().find(|(_, kws)| mentions(&summary, kws))?;
        (*index, Confidence::Low)
    };

    Some(Announcement {
        source: item.source.clone(),
        title,
        link: item.link.clone(),
        date: item.date.clone(),
        confidence,
        index,
    })
}

/// Fetch one index; on failure log and return an empty set.
pub async fn collect_members(provider: &dyn MembershipProvider) -> BTreeSet<String> {
    ensure_metrics_described();
    match provider.fetch_members().await {
        Ok(set) => {
            counter!("members_fetched_total").increment(set.len() as u64);
            tracing::debug!(provider = provider.name(), count = set.len(), "members fetched");
            set
        }
        Err(e) => {
            tracing::warn!(error = ?e, provider = provider.name(), "membership fetch failed");
            counter!("fetch_errors_total").increment(1);
            BTreeSet::new()
        }
    }
}

/// Fetch every announcement source, keep items mentioning a tracked index,
/// and report each link once. Failing providers contribute nothing.
pub async fn collect_announcements(
    providers: &[Box<dyn AnnouncementProvider>],
    keywords: &[(IndexId, Vec<String>)],
) -> Vec<Announcement> {
    ensure_metrics_described();

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for p in providers {
        let items = match p.fetch_latest().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "announcement fetch failed");
                counter!("fetch_errors_total").increment(1);
                continue;
            }
        };
        for it in &items {
            if it.link.is_empty() {
                continue;
            }
            let Some(a) = match_announcement(it, keywords) else {
                continue;
            };
            if seen.insert(a.link.clone()) {
                out.push(a);
            }
        }
    }
    counter!("announcements_matched_total").increment(out.len() as u64);
    out
}
