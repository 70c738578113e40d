//! Index membership watcher — one batch run per invocation.
//! Meant to be started by an external scheduler (cron, CI schedule).

use index_watch::{init_tracing, WatchConfig, Watcher};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = match WatchConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = ?e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let watcher = match Watcher::from_config(&cfg) {
        Ok(w) => w,
        Err(e) => {
            tracing::error!(error = ?e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    match watcher.run_once().await {
        Ok(report) => {
            tracing::info!(
                initialized = report.initialized,
                changed = report.changed(),
                announcements = report.new_announcements.len(),
                saved = report.saved,
                delivered = report.delivered,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Snapshot unreadable: leave it in place for inspection.
            tracing::error!(error = ?e, "run aborted");
            ExitCode::FAILURE
        }
    }
}
