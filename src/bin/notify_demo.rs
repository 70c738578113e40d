//! Sends one test message through every configured channel (stdout/log only when none).

use index_watch::{init_tracing, ingest::http_client, Notification, NotifierMux, Priority, WatchConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = WatchConfig::load()?;
    let client = http_client(&cfg.user_agent, cfg.http_timeout_secs)?;
    let mux = NotifierMux::from_env(&cfg, &client);

    let n = Notification::new(
        "🧪 index-watch test notification\nIf you can read this, the channel works.",
        Priority::Normal,
    );
    let delivered = mux.notify(&n).await;

    println!("notify-demo done (delivered: {delivered})");
    Ok(())
}
