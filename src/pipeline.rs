//! Bounded dispatch queue and the single delivery worker draining it.
//!
//! ```text
//!   fire() ──► flume::bounded(queue_capacity) ──► worker task ──► WebhookSink
//!                (blocks when full)                  │
//!                                                    └──► broadcast outcomes
//! ```
//!
//! Admission is strict FIFO and never drops: a producer facing a full queue
//! blocks until the worker frees a slot. On a multi-thread runtime worker
//! thread the wait goes through `block_in_place`, so the delivery task keeps
//! running elsewhere. A current-thread runtime has no other thread to run
//! the worker on, so admission there fails with [`PipelineError::Full`]
//! instead of hanging. The outcome channel never blocks the worker and
//! overwrites the oldest unread outcome when subscribers fall behind.
//!
//! Everything the sink does while sending runs inside a delivery scope (see
//! [`in_delivery`]); the `tracing` layer uses it to keep transport
//! diagnostics out of the queue.

use std::sync::Arc;

use flume::TrySendError;
use parking_lot::Mutex;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::SharedConfig;
use crate::encode::Encode;
use crate::message::Message;
use crate::sink::WebhookSink;

/// Default number of events the dispatch queue holds before producers block.
pub const DEFAULT_QUEUE_CAPACITY: usize = 30;

/// Default number of unread delivery outcomes kept for subscribers.
pub const DEFAULT_OUTCOME_CAPACITY: usize = 32;

/// Sizing of the dispatch queue and the outcome channel.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub queue_capacity: usize,
    pub outcome_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            outcome_capacity: DEFAULT_OUTCOME_CAPACITY,
        }
    }
}

/// Result of one delivery attempt, published for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The server accepted the payload; carries the response body.
    Delivered(String),
    /// Encoding or transport failed; carries the reason.
    Failed(String),
}

/// Lifecycle state of the delivery worker.
///
/// `Draining` is only reported for events dequeued after admission closed.
/// When the queue is already empty at that point, the worker moves straight
/// from `Delivering` (or `Idle`) to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Delivering,
    /// Admission is closed; the worker is flushing what is left in the queue.
    Draining,
    Stopped,
}

/// Error returned by pipeline admission and startup.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("delivery pipeline is not running")]
    Closed,

    #[error("dispatch queue is full and the current-thread runtime cannot wait for the worker")]
    Full,

    #[error("no Tokio runtime available to spawn the delivery worker")]
    NoRuntime,
}

tokio::task_local! {
    static DELIVERY: ();
}

/// True while the calling code runs inside a delivery worker's sink call.
pub fn in_delivery() -> bool {
    DELIVERY.try_with(|_| ()).is_ok()
}

struct Running {
    sender: flume::Sender<Message>,
    handle: JoinHandle<()>,
}

/// Dispatch queue plus delivery worker, started and stopped as a unit.
///
/// A stopped pipeline can be started again; doing so allocates a fresh
/// queue and worker.
pub struct Pipeline {
    config: SharedConfig,
    sink: Arc<dyn WebhookSink>,
    settings: PipelineConfig,
    outcomes: broadcast::Sender<DeliveryOutcome>,
    running: Mutex<Option<Running>>,
    // Outlives `running` so a draining worker stays observable during `stop`.
    state: Mutex<watch::Receiver<WorkerState>>,
}

impl Pipeline {
    /// Create a pipeline without starting it.
    ///
    /// Capacities below one are raised to one.
    pub fn new(config: SharedConfig, sink: Arc<dyn WebhookSink>, settings: PipelineConfig) -> Self {
        let settings = PipelineConfig {
            queue_capacity: settings.queue_capacity.max(1),
            outcome_capacity: settings.outcome_capacity.max(1),
        };
        let (outcomes, _) = broadcast::channel(settings.outcome_capacity);
        let (_, state) = watch::channel(WorkerState::Stopped);

        Self {
            config,
            sink,
            settings,
            outcomes,
            running: Mutex::new(None),
            state: Mutex::new(state),
        }
    }

    /// Allocate the queue and spawn the worker on the current Tokio runtime.
    ///
    /// Calling this while the pipeline runs is a no-op.
    pub fn start(&self) -> Result<(), PipelineError> {
        let mut running = self.running.lock();
        if running.is_some() {
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| PipelineError::NoRuntime)?;

        let (sender, receiver) = flume::bounded(self.settings.queue_capacity);
        let (state_tx, state_rx) = watch::channel(WorkerState::Idle);

        let worker = Worker {
            receiver,
            sink: Arc::clone(&self.sink),
            config: self.config.clone(),
            outcomes: self.outcomes.clone(),
            state: state_tx,
        };
        let handle = runtime.spawn(worker.run());

        debug!(
            queue_capacity = self.settings.queue_capacity,
            "mattermost delivery worker started"
        );

        *self.state.lock() = state_rx;
        *running = Some(Running { sender, handle });
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Current worker state; `Stopped` once the worker has exited.
    pub fn state(&self) -> WorkerState {
        *self.state.lock().borrow()
    }

    /// Receive delivery outcomes published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryOutcome> {
        self.outcomes.subscribe()
    }

    /// Queue `message` for delivery.
    ///
    /// Waits while the queue is full, except on a current-thread runtime
    /// where that wait could never end.
    ///
    /// **Returns**
    /// - `Err(PipelineError::Closed)` when the pipeline is not running.
    /// - `Err(PipelineError::Full)` when the queue is full and the caller
    ///   is on a current-thread runtime.
    pub fn enqueue(&self, message: Message) -> Result<(), PipelineError> {
        let sender = self
            .running
            .lock()
            .as_ref()
            .map(|running| running.sender.clone())
            .ok_or(PipelineError::Closed)?;

        match sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(PipelineError::Closed),
            Err(TrySendError::Full(message)) => wait_for_slot(&sender, message),
        }
    }

    /// Close admission and wait until every queued event has been handled.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().take() else {
            return;
        };
        let Running { sender, handle } = running;

        // Producers blocked in `enqueue` hold their own sender clone; the
        // queue closes once the last of them is admitted.
        drop(sender);

        if let Err(e) = handle.await {
            warn!(error = %e, "mattermost delivery worker ended abnormally");
        }
        debug!("mattermost delivery worker stopped");
    }
}

fn wait_for_slot(sender: &flume::Sender<Message>, message: Message) -> Result<(), PipelineError> {
    let send = || sender.send(message).map_err(|_| PipelineError::Closed);
    match Handle::try_current().map(|runtime| runtime.runtime_flavor()) {
        Ok(RuntimeFlavor::CurrentThread) => Err(PipelineError::Full),
        Ok(_) => tokio::task::block_in_place(send),
        Err(_) => send(),
    }
}

struct Worker {
    receiver: flume::Receiver<Message>,
    sink: Arc<dyn WebhookSink>,
    config: SharedConfig,
    outcomes: broadcast::Sender<DeliveryOutcome>,
    state: watch::Sender<WorkerState>,
}

impl Worker {
    async fn run(self) {
        while let Ok(message) = self.receiver.recv_async().await {
            let busy = if self.receiver.is_disconnected() {
                WorkerState::Draining
            } else {
                WorkerState::Delivering
            };
            self.state.send_replace(busy);

            self.deliver(message).await;

            if !self.receiver.is_disconnected() {
                self.state.send_replace(WorkerState::Idle);
            }
        }

        self.state.send_replace(WorkerState::Stopped);
    }

    async fn deliver(&self, message: Message) {
        let outcome = match message.to_payload() {
            Ok(payload) => {
                let endpoint = self.config.endpoint();
                match DELIVERY.scope((), self.sink.send(&endpoint, payload)).await {
                    Ok(body) => {
                        debug!(response = %body, "log event delivered to mattermost");
                        DeliveryOutcome::Delivered(body)
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to deliver log event to mattermost");
                        DeliveryOutcome::Failed(e.to_string())
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "dropping log event that could not be encoded");
                DeliveryOutcome::Failed(e.to_string())
            }
        };

        // No subscribers is the normal case.
        let _ = self.outcomes.send(outcome);
    }
}
