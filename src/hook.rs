use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::{DeliveryConfig, HookSettings, SharedConfig};
use crate::level::Level;
use crate::message::Message;
use crate::pipeline::{DeliveryOutcome, Pipeline, PipelineConfig, PipelineError, WorkerState};
use crate::record::{LogEntry, LogEvent};
use crate::sink::WebhookSink;

/// Entry point the logging integration calls once per event.
///
/// Owns the shared [`DeliveryConfig`] and the delivery [`Pipeline`]. Clones
/// share both, so a clone handed to a `tracing` layer and one kept for
/// shutdown drive the same pipeline. Separate `MattermostHook::new` calls
/// build fully independent pipelines.
#[derive(Clone)]
pub struct MattermostHook {
    config: SharedConfig,
    pipeline: Arc<Pipeline>,
}

impl MattermostHook {
    /// Create the hook and start its delivery worker.
    ///
    /// **Parameters**
    /// - `settings`: endpoint, channel, username, attachment template and
    ///   minimum level.
    /// - `sink`: transport used by the worker, usually a
    ///   [`WebhookClient`](crate::webhook::WebhookClient).
    /// - `pipeline`: queue and outcome channel sizing.
    ///
    /// **Returns**
    /// - `Err(PipelineError::NoRuntime)` when called outside a Tokio runtime.
    pub fn new(
        settings: HookSettings,
        sink: Arc<dyn WebhookSink>,
        pipeline: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        let config = SharedConfig::new(DeliveryConfig::new(settings));
        let pipeline = Arc::new(Pipeline::new(config.clone(), sink, pipeline));
        pipeline.start()?;
        Ok(Self { config, pipeline })
    }

    /// Replace the settings of this hook in place.
    ///
    /// The hostname resolved at creation is kept. Starts the pipeline again
    /// if it was stopped.
    pub fn configure(&self, settings: HookSettings) -> Result<(), PipelineError> {
        self.config.reconfigure(settings);
        self.pipeline.start()
    }

    /// Levels forwarded by this hook, most severe first.
    pub fn levels(&self) -> Vec<Level> {
        Level::at_or_above(self.config.min_level())
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level <= self.config.min_level()
    }

    /// Queue `entry` for delivery.
    ///
    /// Returns as soon as the event is admitted. When the queue is full the
    /// caller waits until the worker frees a slot. Entries below the minimum
    /// level are ignored.
    ///
    /// **Returns**
    /// - `Err(PipelineError::Closed)` once [`stop`](Self::stop) has run.
    /// - `Err(PipelineError::Full)` when the queue is full on a
    ///   current-thread runtime, where waiting would stall the worker.
    pub fn fire(&self, entry: &LogEntry) -> Result<(), PipelineError> {
        if !self.is_enabled(entry.level) {
            return Ok(());
        }

        let template = self.config.default_attachment();
        let event = LogEvent::new(entry, template.as_ref());
        let message = Message::new(
            self.config.channel(),
            self.config.username(),
            self.config.hostname(),
            event,
        );

        self.pipeline.enqueue(message)
    }

    /// Receive outcomes of deliveries that finish after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryOutcome> {
        self.pipeline.subscribe()
    }

    pub fn state(&self) -> WorkerState {
        self.pipeline.state()
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Stop admission and wait for every queued event to be delivered.
    pub async fn stop(&self) {
        self.pipeline.stop().await;
    }
}
