// src/notify/message.rs
use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::diff::IndexDiff;
use crate::index::IndexId;
use crate::ingest::types::Announcement;

fn stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Header plus "Added"/"Removed" blocks, one sorted symbol per line.
pub fn index_change(index: IndexId, diff: &IndexDiff, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🔔 {index} membership changed");
    let _ = writeln!(out, "Date: {}", stamp(now));

    if !diff.added.is_empty() {
        let _ = writeln!(out, "\n✅ Added to {index}:");
        for s in &diff.added {
            let _ = writeln!(out, "  • {s}");
        }
    }
    if !diff.removed.is_empty() {
        let _ = writeln!(out, "\n❌ Removed from {index}:");
        for s in &diff.removed {
            let _ = writeln!(out, "  • {s}");
        }
    }
    out
}

/// First-run notice with member counts per tracked index.
pub fn initialized(counts: &[(IndexId, usize)], now: DateTime<Utc>) -> String {
    let mut out = String::from("🚀 Started tracking index changes\n");
    let _ = writeln!(out, "Date: {}", stamp(now));
    for (index, n) in counts {
        let _ = writeln!(out, "{index}: {n} symbols");
    }
    out
}

pub fn announcement(a: &Announcement) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📰 {} announcement ({} confidence)", a.index, a.confidence);
    let _ = writeln!(out, "Source: {}", a.source);
    let _ = writeln!(out, "{}", a.title);
    if let Some(d) = &a.date {
        let _ = writeln!(out, "Date: {d}");
    }
    let _ = writeln!(out, "{}", a.link);
    out
}
