use std::fmt;
use std::str::FromStr;

/// Severity of a log event, ordered from most to least severe.
///
/// `Panic < Fatal < ... < Trace`, so "at or above" a minimum level means
/// "less than or equal to" in the derived ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Debug,
    #[default]
    Trace,
}

const ICONS: [&str; 7] = [
    ":x:",
    ":bangbang:",
    ":exclamation:",
    ":interrobang:",
    ":white_circle:",
    ":black_circle:",
    ":mag_right:",
];

const COLORS: [&str; 7] = [
    "#FF0000", "#CC0000", "#990000", "#9F6000", "#FFFFFF", "#000000", "#000000",
];

impl Level {
    /// Every level, most severe first.
    pub const ALL: [Level; 7] = [
        Level::Panic,
        Level::Fatal,
        Level::Error,
        Level::Warning,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    /// Emoji shortcode shown in front of the plain-text message.
    pub fn icon(self) -> &'static str {
        ICONS[self as usize]
    }

    /// Attachment side-bar color.
    pub fn color(self) -> &'static str {
        COLORS[self as usize]
    }

    /// Levels that are at least as severe as `min`, most severe first.
    pub fn at_or_above(min: Level) -> Vec<Level> {
        Level::ALL.iter().copied().filter(|l| *l <= min).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Panic => "panic",
            Level::Fatal => "fatal",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::INFO => Level::Info,
            tracing::Level::DEBUG => Level::Debug,
            _ => Level::Trace,
        }
    }
}

/// Error returned when a level name cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(Level::Panic),
            "fatal" => Ok(Level::Fatal),
            "error" => Ok(Level::Error),
            "warn" | "warning" => Ok(Level::Warning),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            "trace" => Ok(Level::Trace),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_at_or_above_warning() {
        assert_eq!(
            Level::at_or_above(Level::Warning),
            vec![Level::Panic, Level::Fatal, Level::Error, Level::Warning]
        );
        assert_eq!(Level::at_or_above(Level::Panic), vec![Level::Panic]);
        assert_eq!(Level::at_or_above(Level::Trace).len(), 7);
    }

    #[test]
    fn lookup_tables_follow_severity() {
        assert_eq!(Level::Panic.icon(), ":x:");
        assert_eq!(Level::Info.icon(), ":white_circle:");
        assert_eq!(Level::Trace.icon(), ":mag_right:");
        assert_eq!(Level::Warning.color(), "#9F6000");
        assert_eq!(Level::Debug.color(), Level::Trace.color());
    }

    #[test]
    fn parse_level_names() {
        assert_eq!("WARN".parse::<Level>(), Ok(Level::Warning));
        assert_eq!(" fatal ".parse::<Level>(), Ok(Level::Fatal));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn maps_tracing_levels() {
        assert_eq!(Level::from(&tracing::Level::ERROR), Level::Error);
        assert_eq!(Level::from(&tracing::Level::WARN), Level::Warning);
        assert_eq!(Level::from(&tracing::Level::TRACE), Level::Trace);
    }
}
