use serde_json::json;

use crate::config::SlackConfig;

/// Fire-and-forget Slack notification. Failures are logged and swallowed —
/// a dead webhook must never fail a submission.
pub struct Notifier {
    client: reqwest::Client,
    config: Option<SlackConfig>,
}

impl Notifier {
    pub fn new(config: Option<SlackConfig>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(5))
                .build()
                .expect("Failed to build reqwest client"),
            config,
        }
    }

    pub async fn notify(&self, text: &str) {
        let Some(config) = &self.config else {
            tracing::debug!("Slack webhook not configured, skipping notification");
            return;
        };

        let payload = json!({
            "text": text,
            "username": config.username,
            "mrkdwn": true,
        });

        match self
            .client
            .post(&config.webhook_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) if !resp.status().is_success() => {
                tracing::warn!("Slack notification returned status {}", resp.status());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Slack notification failed: {e}");
            }
        }
    }
}
