use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use tracing_mattermost::{
    init::{init_tracing_with_config, LayerConfig},
    sink::WebhookSink,
    HookSettings, Level,
};

/// Example of plugging in a completely custom transport by implementing
/// the `WebhookSink` trait directly. Imagine this relays payloads through
/// some internal message bus instead of posting them over HTTP.
struct StdoutRelay;

#[async_trait]
impl WebhookSink for StdoutRelay {
    async fn send(&self, endpoint: &str, payload: Vec<u8>) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        // Here you would call your own client library.
        // For the sake of example we just print the payload.
        println!("[relay -> {}] {}", endpoint, String::from_utf8_lossy(&payload));
        Ok("ok".to_string())
    }
}

#[tokio::main]
async fn main() {
    let sink: Arc<dyn WebhookSink> = Arc::new(StdoutRelay);

    let hook = init_tracing_with_config(
        HookSettings::new("relay://ops").min_level(Level::Info),
        sink,
        LayerConfig::default(),
    )
    .expect("install tracing");

    info!("custom backend example started");
    error!(db = "my-custom-db", "simulated error sent via custom backend");

    hook.stop().await;
}
