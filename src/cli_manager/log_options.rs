use crate::logging::{Formatter, Handler, LogDestination, LogLevel, LoggerRegistry};
use clap::Arg;
use std::{str::FromStr, sync::Arc};

pub(crate) const LOG_LEVEL_ARG: &str = "APP_HELPER_LOG_LEVEL_ARG";
pub(crate) const LOG_FILE_ARG: &str = "APP_HELPER_LOG_FILE_ARG";

/// Splits a `[NAME:]VALUE` option value.
///
/// The string is split at its first colon;
/// the part before it is the name (`None` if it is empty) and the part after it is the value,
/// which may contain colons itself.
/// Without any colon, the name is `None` and the value is the whole string.
pub fn split_option(option: &str) -> (Option<&str>, &str) {
    match option.find(':') {
        Some(0) => (None, &option[1..]),
        Some(n) => (Some(&option[..n]), &option[n + 1..]),
        None => (None, option),
    }
}

/// A log option given on the command line: a value to apply to a logger.
///
/// A `None` logger stands for the root logger.
#[derive(Debug)]
pub struct LogOptionEntry<T> {
    /// the name of the targeted logger
    pub logger: Option<String>,
    /// the value to apply
    pub value: T,
}

impl<T> LogOptionEntry<T> {
    /// Builds a new entry.
    pub fn new(logger: Option<&str>, value: T) -> Self {
        LogOptionEntry {
            logger: logger.map(|s| s.to_string()),
            value,
        }
    }
}

/// Returns the argument used to set logger levels (`-l`, `--log-level`).
///
/// The argument may be repeated; its values are checked while the command line is parsed.
pub fn log_level_cli_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name(LOG_LEVEL_ARG)
        .short("l")
        .long("log-level")
        .value_name("LOGGER:LEVEL")
        .takes_value(true)
        .multiple(true)
        .number_of_values(1)
        .empty_values(false)
        .validator(|v| check_level_option(&v))
        .help(
            "set a logger level; LOGGER is optional and defaults to the root logger (may be repeated, case-insensitive levels: NOTSET, DEBUG, VERBOSE, INFO, WARNING, ERROR, CRITICAL)",
        )
}

/// Returns the argument used to add log destinations (`-L`, `--log-file`).
///
/// The argument may be repeated; file destinations are created while the command line is parsed.
pub fn log_file_cli_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name(LOG_FILE_ARG)
        .short("L")
        .long("log-file")
        .value_name("LOGGER:FILE")
        .takes_value(true)
        .multiple(true)
        .number_of_values(1)
        .empty_values(false)
        .validator(|v| check_file_option(&v))
        .help(
            "write the logs of a logger to a file, or to stdout, stderr or null; LOGGER is optional and defaults to the root logger (may be repeated)",
        )
}

fn check_level_option(option: &str) -> Result<(), String> {
    parse_level_option(option).map(|_| ())
}

pub(crate) fn parse_level_option(option: &str) -> Result<LogOptionEntry<LogLevel>, String> {
    let (logger, level) = split_option(option);
    LogLevel::from_str(level)
        .map(|l| LogOptionEntry::new(logger, l))
        .map_err(|_| {
            format!(
                r#"unknown log level "{}" (expected one of {})"#,
                level,
                LogLevel::names()
            )
        })
}

fn check_file_option(option: &str) -> Result<(), String> {
    let (_, destination) = split_option(option);
    if destination.is_empty() {
        Err(format!(r#"missing log destination in "{}""#, option))
    } else {
        Ok(())
    }
}

/// Applies log options to the loggers of a registry.
///
/// The levels are set first, then the handlers are attached, both in the order of the entries,
/// so the last level given for a logger wins.
/// All the handlers share the same formatter.
/// Applying the same options twice attaches the handlers twice.
pub fn apply_log_options(
    registry: &Arc<LoggerRegistry>,
    log_levels: Vec<LogOptionEntry<LogLevel>>,
    log_files: Vec<LogOptionEntry<LogDestination>>,
) {
    for entry in log_levels {
        registry.logger(entry.logger.as_deref()).set_level(entry.value);
    }
    let formatter = Arc::new(Formatter::default());
    for entry in log_files {
        registry
            .logger(entry.logger.as_deref())
            .add_handler(Handler::new(entry.value, Arc::clone(&formatter)));
    }
}
