use crate::sink::WebhookSink;
use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;
use std::time::Duration;

/// Media type of every payload posted to the webhook.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP implementation of [`WebhookSink`] for Mattermost incoming webhooks.
#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    /// Build a client with a small idle connection pool.
    ///
    /// **Returns**
    /// - `Err(..)` if the TLS backend could not be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_max_idle_per_host(3)
            .pool_idle_timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebhookSink for WebhookClient {
    async fn send(
        &self,
        endpoint: &str,
        payload: Vec<u8>,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let resp = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(format!("webhook rejected payload with status {}: {}", status, body).into())
        }
    }
}
