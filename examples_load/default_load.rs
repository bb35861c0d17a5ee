use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use tracing_mattermost::init::{init_tracing_with_config, LayerConfig};
use tracing_mattermost::noop_sink::NoopSink;
use tracing_mattermost::HookSettings;

#[tokio::main]
async fn main() {
    let sink = Arc::new(NoopSink::default());
    let config = LayerConfig {
        enable_stdout: false,
        ..LayerConfig::default()
    };
    let hook = init_tracing_with_config(HookSettings::new("http://localhost/hooks/load"), sink, config)
        .expect("install tracing");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: sent {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    // Drain whatever is still queued
    hook.stop().await;
}
