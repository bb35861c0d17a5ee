use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::error;

use tracing_mattermost::init::{init_tracing_with_config, LayerConfig};
use tracing_mattermost::pipeline::PipelineConfig;
use tracing_mattermost::sink::WebhookSink;
use tracing_mattermost::HookSettings;

/// Sink with a fixed per-request latency, to watch producers being held
/// back once the queue fills up.
struct SlowSink(Duration);

#[async_trait]
impl WebhookSink for SlowSink {
    async fn send(&self, _endpoint: &str, _payload: Vec<u8>) -> Result<String, Box<dyn Error + Send + Sync>> {
        sleep(self.0).await;
        Ok("ok".to_string())
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let sink = Arc::new(SlowSink(Duration::from_millis(5)));

    let layer_config = LayerConfig {
        pipeline: PipelineConfig {
            queue_capacity: 30,
            outcome_capacity: 1,
        },
        enable_stdout: false,
    };

    let hook = init_tracing_with_config(
        HookSettings::new("http://localhost/hooks/slow"),
        sink,
        layer_config,
    )
    .expect("install tracing");

    let n: u64 = 500;
    let start = Instant::now();

    let producer = tokio::task::spawn_blocking(move || {
        for i in 0..n {
            error!(iteration = i, "slow sink load test error");
        }
    });
    producer.await.expect("producer panicked");

    let elapsed = start.elapsed();
    println!("slow sink: admitted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    hook.stop().await;
}
