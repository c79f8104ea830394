//! Plan summary delivery: Discord webhook or console fallback.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

// DiscordNotifier implementation for Notifier
pub struct DiscordNotifier {
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: &str) -> Self {
        DiscordNotifier {
            webhook_url: webhook_url.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        debug!("Posting plan summary to Discord webhook");

        let client = reqwest::Client::builder().user_agent("fxdca/1.0").build()?;
        let response = client
            .post(&self.webhook_url)
            .json(&json!({ "content": message }))
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for webhook delivery", e))?;

        // Discord replies 204 No Content on success
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Webhook error: {} {}", status, body));
        }
        Ok(())
    }
}

/// Fallback when no webhook is configured: print the message locally.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        println!("No webhook configured, printing notification:\n{message}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_discord_delivery_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(body_json(json!({ "content": "plan summary" })))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let notifier = DiscordNotifier::new(&format!("{}/webhook", mock_server.uri()));
        assert!(notifier.send("plan summary").await.is_ok());
    }

    #[tokio::test]
    async fn test_discord_delivery_failure_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&mock_server)
            .await;

        let notifier = DiscordNotifier::new(&format!("{}/webhook", mock_server.uri()));
        let result = notifier.send("plan summary").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_console_notifier_never_fails() {
        assert!(ConsoleNotifier.send("plan summary").await.is_ok());
    }
}
