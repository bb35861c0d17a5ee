use crate::config::HookSettings;
use crate::hook::MattermostHook;
use crate::layer::MattermostLayer;
use crate::pipeline::{PipelineConfig, PipelineError};
use crate::sink::WebhookSink;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the logging layer.
///
/// **Fields**
/// - `pipeline`: dispatch queue and outcome channel sizing.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   installed next to [`MattermostLayer`] so events are also printed to the
///   console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub pipeline: PipelineConfig,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            enable_stdout: true,
        }
    }
}

/// Error returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("failed to build webhook client: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Env(#[from] crate::env::ConfigError),

    #[error("failed to set global subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize the global `tracing` subscriber with a hook posting through
/// `sink`.
///
/// **Parameters**
/// - `settings`: webhook endpoint, routing and minimum level.
/// - `sink`: implementation of [`WebhookSink`] used by the delivery worker.
/// - `config`: [`LayerConfig`] controlling buffering and console output.
///
/// **Returns**
///
/// The [`MattermostHook`] behind the layer. Keep it around and call
/// [`MattermostHook::stop`] before exiting so queued events are delivered.
///
/// Must be called from within a Tokio runtime.
pub fn init_tracing_with_config(
    settings: HookSettings,
    sink: Arc<dyn WebhookSink>,
    config: LayerConfig,
) -> Result<MattermostHook, InitError> {
    let hook = MattermostHook::new(settings, sink, config.pipeline)?;
    let layer = MattermostLayer::new(hook.clone());

    // The fmt layer changes the subscriber type, so the two variants are
    // installed separately.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(hook)
}

/// Initialize tracing with the HTTP webhook client and default sizing.
///
/// Equivalent to calling [`init_tracing_with_config`] with a
/// [`WebhookClient`](crate::webhook::WebhookClient) and
/// [`LayerConfig::default`]. This is the recommended entrypoint for typical
/// services.
#[cfg(feature = "webhook")]
pub fn init_tracing(settings: HookSettings) -> Result<MattermostHook, InitError> {
    let client = crate::webhook::WebhookClient::new().map_err(|e| InitError::Client(Box::new(e)))?;
    let sink = Arc::new(client);
    init_tracing_with_config(settings, sink, LayerConfig::default())
}

/// Same as [`init_tracing`], reading the settings from `MATTERMOST_*`
/// environment variables.
#[cfg(feature = "webhook")]
pub fn init_tracing_from_env() -> Result<MattermostHook, InitError> {
    init_tracing(HookSettings::from_env()?)
}
