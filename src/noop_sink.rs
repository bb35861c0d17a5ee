use crate::sink::WebhookSink;
use async_trait::async_trait;
use std::error::Error;

/// A sink that accepts every payload without sending it anywhere.
///
/// Answers with `ok`, like a Mattermost server does. Useful for measuring the
/// overhead of the pipeline itself and for tests that don't care about the
/// network.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl WebhookSink for NoopSink {
    async fn send(
        &self,
        _endpoint: &str,
        _payload: Vec<u8>,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok("ok".to_string())
    }
}
