use std::sync::Arc;

use parking_lot::Mutex;

use crate::attachment::Attachment;
use crate::env::HOSTNAME_ENV;
use crate::level::Level;

/// Values passed to [`MattermostHook::configure`](crate::hook::MattermostHook::configure).
///
/// **Fields**
/// - `endpoint`: incoming webhook URL.
/// - `channel`: target channel; the webhook's default channel when `None`.
/// - `username`: name the messages are posted under; the hostname when `None`.
/// - `default_attachment`: when set, every event is posted as an attachment
///   built from this template instead of a plain text line.
/// - `min_level`: least severe level that is forwarded.
#[derive(Debug, Clone, Default)]
pub struct HookSettings {
    pub endpoint: String,
    pub channel: Option<String>,
    pub username: Option<String>,
    pub default_attachment: Option<Attachment>,
    pub min_level: Level,
}

impl HookSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HookSettings {
            endpoint: endpoint.into(),
            ..HookSettings::default()
        }
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn default_attachment(mut self, attachment: Attachment) -> Self {
        self.default_attachment = Some(attachment);
        self
    }

    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }
}

/// Runtime delivery configuration shared by the hook and the worker.
#[derive(Debug, Clone, Default)]
pub struct DeliveryConfig {
    pub endpoint: String,
    pub channel: String,
    pub username: String,
    pub default_attachment: Option<Attachment>,
    pub hostname: String,
    pub min_level: Level,
}

impl DeliveryConfig {
    /// Build a config from `settings`, resolving the hostname once.
    pub fn new(settings: HookSettings) -> Self {
        let mut config = DeliveryConfig {
            hostname: resolve_hostname(),
            ..DeliveryConfig::default()
        };
        config.apply(settings);
        config
    }

    /// Overwrite everything except the resolved hostname.
    fn apply(&mut self, settings: HookSettings) {
        self.endpoint = settings.endpoint;
        self.channel = settings.channel.unwrap_or_default();
        self.username = settings.username.unwrap_or_default();
        self.default_attachment = settings.default_attachment;
        self.min_level = settings.min_level;
    }
}

/// Lock-protected handle on a single [`DeliveryConfig`].
///
/// Every accessor takes the lock on its own. Two reads in a row may observe
/// different generations if a reconfiguration lands in between.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<Mutex<DeliveryConfig>>,
}

impl SharedConfig {
    pub fn new(config: DeliveryConfig) -> Self {
        SharedConfig {
            inner: Arc::new(Mutex::new(config)),
        }
    }

    /// Replace the settings in place; the hostname is kept.
    pub fn reconfigure(&self, settings: HookSettings) {
        self.inner.lock().apply(settings);
    }

    pub fn endpoint(&self) -> String {
        self.inner.lock().endpoint.clone()
    }

    pub fn channel(&self) -> String {
        self.inner.lock().channel.clone()
    }

    pub fn username(&self) -> String {
        self.inner.lock().username.clone()
    }

    pub fn default_attachment(&self) -> Option<Attachment> {
        self.inner.lock().default_attachment.clone()
    }

    pub fn hostname(&self) -> String {
        self.inner.lock().hostname.clone()
    }

    pub fn min_level(&self) -> Level {
        self.inner.lock().min_level
    }

    /// Copy of the whole config taken under a single lock.
    pub fn snapshot(&self) -> DeliveryConfig {
        self.inner.lock().clone()
    }
}

/// Resolve the machine hostname, falling back to `$HOSTNAME` and then to an
/// empty string.
pub fn resolve_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .or_else(|| std::env::var(HOSTNAME_ENV).ok())
        .unwrap_or_default()
}
