use tracing_mattermost::env::{
    ConfigError, MATTERMOST_ATTACHMENT_ENV, MATTERMOST_CHANNEL_ENV, MATTERMOST_ENDPOINT_ENV,
    MATTERMOST_MIN_LEVEL_ENV, MATTERMOST_USERNAME_ENV,
};
use tracing_mattermost::{HookSettings, Level};

// Environment is process-wide, so every scenario runs inside one test.
#[test]
fn settings_from_env() {
    for key in [
        MATTERMOST_ENDPOINT_ENV,
        MATTERMOST_CHANNEL_ENV,
        MATTERMOST_USERNAME_ENV,
        MATTERMOST_MIN_LEVEL_ENV,
        MATTERMOST_ATTACHMENT_ENV,
    ] {
        std::env::remove_var(key);
    }

    assert!(matches!(
        HookSettings::from_env(),
        Err(ConfigError::Missing(MATTERMOST_ENDPOINT_ENV))
    ));

    std::env::set_var(MATTERMOST_ENDPOINT_ENV, "https://my.mattermost.org/hooks/xxx");
    let settings = HookSettings::from_env().unwrap();
    assert_eq!(settings.endpoint, "https://my.mattermost.org/hooks/xxx");
    assert_eq!(settings.channel, None);
    assert_eq!(settings.username, None);
    assert_eq!(settings.min_level, Level::Trace);
    assert!(settings.default_attachment.is_none());

    std::env::set_var(MATTERMOST_CHANNEL_ENV, "log_alpha");
    std::env::set_var(MATTERMOST_USERNAME_ENV, "app-name");
    std::env::set_var(MATTERMOST_MIN_LEVEL_ENV, "warn");
    std::env::set_var(MATTERMOST_ATTACHMENT_ENV, r#"{"pretext":"Send from env"}"#);
    let settings = HookSettings::from_env().unwrap();
    assert_eq!(settings.channel.as_deref(), Some("log_alpha"));
    assert_eq!(settings.username.as_deref(), Some("app-name"));
    assert_eq!(settings.min_level, Level::Warning);
    assert_eq!(settings.default_attachment.unwrap().pretext, "Send from env");

    std::env::set_var(MATTERMOST_MIN_LEVEL_ENV, "loud");
    assert!(matches!(HookSettings::from_env(), Err(ConfigError::Level(_))));

    std::env::set_var(MATTERMOST_MIN_LEVEL_ENV, "error");
    std::env::set_var(MATTERMOST_ATTACHMENT_ENV, "not json");
    assert!(matches!(HookSettings::from_env(), Err(ConfigError::Attachment(_))));
}
