// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod diff;
pub mod index;
pub mod ingest;
pub mod notify;
pub mod snapshot;
pub mod watcher;

// ---- Re-exports for stable public API ----
pub use crate::config::WatchConfig;
pub use crate::diff::IndexDiff;
pub use crate::index::IndexId;
pub use crate::notify::{Notification, Notifier, NotifierMux, Priority};
pub use crate::snapshot::{MembershipSnapshot, SnapshotStore};
pub use crate::watcher::{RunReport, Watcher};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stdout subscriber. `RUST_LOG` filters (default
/// `index_watch=info,warn`); `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("index_watch=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}
