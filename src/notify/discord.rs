use super::{Notification, Notifier, Priority};
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const ENV_WEBHOOK: &str = "DISCORD_WEBHOOK";
/// Discord rejects `content` longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(webhook: String, client: Client) -> Self {
        Self {
            webhook,
            client,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn from_env(client: Client) -> Option<Self> {
        std::env::var(ENV_WEBHOOK)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|url| Self::new(url.trim().to_string(), client))
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: String,
}

impl DiscordWebhookPayload {
    fn from_notification(n: &Notification) -> Self {
        let mut content = match n.priority {
            Priority::High => format!("🚨 {}", n.message.trim()),
            Priority::Normal => n.message.trim().to_string(),
        };
        if content.chars().count() > MAX_CONTENT_CHARS {
            content = content.chars().take(MAX_CONTENT_CHARS - 1).collect();
            content.push('…');
        }
        Self { content }
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, n: &Notification) -> Result<()> {
        let payload = DiscordWebhookPayload::from_notification(n);
        let rsp = self
            .client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("Discord webhook request failed: {e}"))?;
        rsp.error_for_status_ref()
            .map_err(|e| anyhow!("Discord webhook HTTP error: {e}"))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}
