//! Appstrap provides helpers to bootstrap command line applications.
//!
//! Applications are built from an [`AppHelper`], which holds the CLI parser, the subcommands and the loggers,
//! and a main function run either on the calling thread ([`Application`]) or in an async runtime ([`AsyncApplication`]).
//!
//! Every application accepts the `-l/--log-level [LOGGER:]LEVEL` and `-L/--log-file [LOGGER:]FILE` options,
//! which set the level of the loggers and where they write.
//! Besides the usual ones, a `VERBOSE` level sits between `DEBUG` and `INFO`.
//!
//! [`AppHelper`]: struct.AppHelper.html
//! [`Application`]: struct.Application.html
//! [`AsyncApplication`]: struct.AsyncApplication.html

#![warn(missing_docs)]

mod app_helper;
mod cli_manager;
pub mod logging;

pub use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

pub use app_helper::{AppHelper, AppState, Application, AsyncApplication, AsyncMain, Main, Runner};
pub use cli_manager::{
    apply_log_options, log_file_cli_arg, log_level_cli_arg, split_option, ArgumentParser, Command,
    LogOptionEntry, ParsedArgs,
};
pub use logging::{get_logger, LogLevel, Logger, LoggerRegistry};
