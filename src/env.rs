//! Environment variable names used by this crate for convenient
//! configuration of the hook from services.
//!
//! These are purely helpers; the hook itself takes an explicit
//! [`HookSettings`] and never reads the environment on its own, except for
//! the hostname fallback.

use crate::attachment::Attachment;
use crate::config::HookSettings;
use crate::level::{Level, ParseLevelError};

/// Incoming webhook URL, e.g. `https://chat.example.org/hooks/xxx`.
pub const MATTERMOST_ENDPOINT_ENV: &str = "MATTERMOST_ENDPOINT";

/// Optional target channel.
pub const MATTERMOST_CHANNEL_ENV: &str = "MATTERMOST_CHANNEL";

/// Optional username messages are posted under.
pub const MATTERMOST_USERNAME_ENV: &str = "MATTERMOST_USERNAME";

/// Optional minimum level name (`error`, `warn`, `info`, ...).
pub const MATTERMOST_MIN_LEVEL_ENV: &str = "MATTERMOST_MIN_LEVEL";

/// Optional attachment template as a JSON object.
pub const MATTERMOST_ATTACHMENT_ENV: &str = "MATTERMOST_ATTACHMENT";

/// Hostname fallback when the system hostname cannot be resolved.
pub const HOSTNAME_ENV: &str = "HOSTNAME";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Error returned when building [`HookSettings`] from the environment.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid MATTERMOST_MIN_LEVEL: {0}")]
    Level(#[from] ParseLevelError),

    #[error("invalid MATTERMOST_ATTACHMENT: {0}")]
    Attachment(#[from] serde_json::Error),
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl HookSettings {
    /// Build settings from the `MATTERMOST_*` variables.
    ///
    /// Only the endpoint is required; the minimum level defaults to `trace`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint =
            non_empty(MATTERMOST_ENDPOINT_ENV).ok_or(ConfigError::Missing(MATTERMOST_ENDPOINT_ENV))?;

        let min_level = env_or(MATTERMOST_MIN_LEVEL_ENV, "trace").parse::<Level>()?;

        let default_attachment = non_empty(MATTERMOST_ATTACHMENT_ENV)
            .map(|raw| serde_json::from_str::<Attachment>(&raw))
            .transpose()?;

        Ok(HookSettings {
            endpoint,
            channel: non_empty(MATTERMOST_CHANNEL_ENV),
            username: non_empty(MATTERMOST_USERNAME_ENV),
            default_attachment,
            min_level,
        })
    }
}
