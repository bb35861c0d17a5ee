pub mod level;
pub mod record;
pub mod encode;
pub mod attachment;
pub mod message;
pub mod config;
pub mod env;
pub mod sink;
pub mod pipeline;
pub mod hook;
pub mod layer;

#[cfg(feature = "webhook")]
pub mod webhook;

pub mod init;
pub mod noop_sink;
pub mod signal;

pub use attachment::{Attachment, Field, Fields};
pub use config::HookSettings;
pub use hook::MattermostHook;
pub use layer::MattermostLayer;
pub use level::Level;
pub use pipeline::{DeliveryOutcome, PipelineConfig, PipelineError, WorkerState};
pub use record::LogEntry;
