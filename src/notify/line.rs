// src/notify/line.rs
use anyhow::{Context, Result};
use reqwest::Client;

use super::{Notification, Notifier, Priority};

const ENV_TOKEN: &str = "LINE_NOTIFY_TOKEN";

/// LINE Notify: form-encoded `message` with a bearer token. Normal priority
/// is delivered silently.
pub struct LineNotifier {
    endpoint: String,
    token: String,
    client: Client,
}

impl LineNotifier {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        }
    }

    pub fn from_env(endpoint: &str, client: Client) -> Option<Self> {
        std::env::var(ENV_TOKEN)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|t| Self::new(endpoint, t.trim(), client))
    }
}

#[async_trait::async_trait]
impl Notifier for LineNotifier {
    async fn send(&self, n: &Notification) -> Result<()> {
        // LINE shows the message after the token name; a leading newline keeps it readable.
        let message = format!("\n{}", n.message.trim());
        let mut form = vec![("message", message)];
        if n.priority == Priority::Normal {
            form.push(("notificationDisabled", "true".to_string()));
        }

        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .form(&form)
            .send()
            .await
            .context("line notify post")?
            .error_for_status()
            .context("line notify non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "line"
    }
}
