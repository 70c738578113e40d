// src/notify/mod.rs
//! Outbound notifications. Each channel is enabled by its env secret; the
//! mux fans a message out and never propagates delivery failures.

pub mod discord;
pub mod line;
pub mod message;
pub mod slack;

use anyhow::Result;
use metrics::counter;

use crate::config::WatchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub priority: Priority,
}

impl Notification {
    pub fn new(message: impl Into<String>, priority: Priority) -> Self {
        Self {
            message: message.into(),
            priority,
        }
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, n: &Notification) -> Result<()>;
    fn name(&self) -> &'static str;
}

#[derive(Default)]
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    /// Discord, Slack and LINE, each only when its secret is set.
    pub fn from_env(cfg: &WatchConfig, client: &reqwest::Client) -> Self {
        let mut channels: Vec<Box<dyn Notifier>> = Vec::new();
        if let Some(d) = discord::DiscordNotifier::from_env(client.clone()) {
            channels.push(Box::new(d));
        }
        if let Some(s) = slack::SlackNotifier::from_env(client.clone()) {
            channels.push(Box::new(s));
        }
        if let Some(l) = line::LineNotifier::from_env(&cfg.line.endpoint, client.clone()) {
            channels.push(Box::new(l));
        }
        if channels.is_empty() {
            tracing::warn!("no notification channel configured; messages are logged only");
        }
        Self { channels }
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// True if at least one channel accepted the message.
    pub async fn notify(&self, n: &Notification) -> bool {
        crate::ingest::ensure_metrics_described();
        tracing::info!(priority = ?n.priority, "notification:\n{}", n.message);
        let mut delivered = false;
        for ch in &self.channels {
            match ch.send(n).await {
                Ok(()) => {
                    tracing::debug!(channel = ch.name(), "delivered");
                    delivered = true;
                }
                Err(e) => {
                    tracing::warn!(error = ?e, channel = ch.name(), "delivery failed");
                    counter!("notify_failures_total").increment(1);
                }
            }
        }
        delivered
    }
}
