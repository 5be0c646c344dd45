use serde::{de, Deserialize, Deserializer};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// The severity levels handled by the loggers.
///
/// Levels are ordered by their numeric value.
/// Besides the usual levels, a `VERBOSE` level sits between `DEBUG` and `INFO`.
///
/// Level names are parsed without taking care of the case;
/// `WARN` and `FATAL` are accepted as aliases for `WARNING` and `CRITICAL`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum LogLevel {
    /// No level set: the level of the closest ancestor applies
    #[strum(to_string = "NOTSET")]
    NotSet = 0,
    /// Debugging messages
    #[strum(to_string = "DEBUG")]
    Debug = 10,
    /// Messages more detailed than the informational ones, but not meant for debugging
    #[strum(to_string = "VERBOSE")]
    Verbose = 15,
    /// Informational messages
    #[strum(to_string = "INFO")]
    Info = 20,
    /// Warnings
    #[strum(to_string = "WARNING", serialize = "WARN")]
    Warning = 30,
    /// Errors
    #[strum(to_string = "ERROR")]
    Error = 40,
    /// Critical errors
    #[strum(to_string = "CRITICAL", serialize = "FATAL")]
    Critical = 50,
}

impl LogLevel {
    /// Returns the numeric value of the level.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Returns the level of the `log` crate that is the closest to this one.
    ///
    /// This is mainly used to choose terminal colors.
    pub fn to_log_level(self) -> log::Level {
        match self {
            LogLevel::NotSet => log::Level::Trace,
            LogLevel::Debug | LogLevel::Verbose => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error | LogLevel::Critical => log::Level::Error,
        }
    }

    /// Returns the comma-separated list of the level names, in increasing order.
    pub fn names() -> String {
        LogLevel::iter()
            .map(|l| l.to_string())
            .collect::<Vec<String>>()
            .join(", ")
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Error => LogLevel::Error,
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        LogLevel::from_str(&name).map_err(|_| {
            de::Error::custom(format!(
                r#"unknown log level "{}" (expected one of {})"#,
                name,
                LogLevel::names()
            ))
        })
    }
}
