use crate::hook::MattermostHook;
use tracing::{info, warn};

/// Wait for a termination signal, then drain the hook.
///
/// Listens for Ctrl-C everywhere, and additionally for `SIGTERM` and
/// `SIGQUIT` on Unix. Delivery of what was queued is best effort: the
/// process may still be killed before the worker finishes.
pub async fn shutdown_on_signal(hook: MattermostHook) {
    wait_for_signal().await;
    info!("termination signal received, draining mattermost hook");
    hook.stop().await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut term, mut quit) = match (signal(SignalKind::terminate()), signal(SignalKind::quit())) {
        (Ok(term), Ok(quit)) => (term, quit),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "cannot listen for SIGTERM/SIGQUIT, waiting for Ctrl-C only");
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c() => {}
        _ = term.recv() => {}
        _ = quit.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
