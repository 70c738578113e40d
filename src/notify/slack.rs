use anyhow::{Context, Result};
use reqwest::Client;

use super::{Notification, Notifier, Priority};

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
}

impl SlackNotifier {
    pub fn from_env(client: Client) -> Option<Self> {
        std::env::var("SLACK_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|url| Self::new(url.trim().to_string(), client))
    }

    pub fn new(url: String, client: Client) -> Self {
        Self {
            webhook_url: url,
            client,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, n: &Notification) -> Result<()> {
        let text = match n.priority {
            Priority::High => format!(":rotating_light: {}", n.message.trim()),
            Priority::Normal => n.message.trim().to_string(),
        };
        let body = serde_json::json!({ "text": text });

        self.client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
