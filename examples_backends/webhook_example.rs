use tracing::{error, info, warn};

use tracing_mattermost::init::init_tracing_from_env;
use tracing_mattermost::signal::shutdown_on_signal;

/// Reads MATTERMOST_ENDPOINT (and the optional MATTERMOST_* variables) and
/// posts a few events to the webhook.
#[tokio::main]
async fn main() {
    let hook = init_tracing_from_env().expect("install tracing");

    // Drain queued events if the process is interrupted.
    tokio::spawn(shutdown_on_signal(hook.clone()));

    info!(k1 = "v1", k2 = "v2", "Test info");
    warn!(k1 = "v1", k2 = "v2", "Test warning");
    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    hook.stop().await;
}
