use super::log_options::{
    apply_log_options, log_file_cli_arg, log_level_cli_arg, parse_level_option, split_option,
    LogOptionEntry, LOG_FILE_ARG, LOG_LEVEL_ARG,
};
use crate::logging::{LogDestination, LogLevel, LoggerRegistry};
use clap::{App, AppSettings, Arg, ArgMatches, ErrorKind};
use std::{ffi::OsString, ops::Deref, sync::Arc};

/// A command line parser built upon a clap `App`, which may handle the log options.
///
/// Parsing is done in two phases.
/// While parsing, the log options are checked and staged:
/// levels are validated and file destinations are created and opened.
/// The loggers are only modified when the staged options are applied,
/// by calling [`ParsedArgs::apply_logging_opts`].
///
/// [`ParsedArgs::apply_logging_opts`]: struct.ParsedArgs.html#method.apply_logging_opts
pub struct ArgumentParser<'a> {
    app: App<'a, 'a>,
}

impl<'a> ArgumentParser<'a> {
    /// Builds a new parser for a program.
    ///
    /// If `add_log_args` is set, the `-l/--log-level` and `-L/--log-file` options are added.
    pub fn new(prog: &'a str, add_log_args: bool) -> Self {
        let mut app = App::new(prog).setting(AppSettings::DisableVersion);
        if add_log_args {
            app = app.arg(log_level_cli_arg()).arg(log_file_cli_arg());
        }
        ArgumentParser { app }
    }

    /// Sets the version, which enables the `--version` flag.
    pub fn version(mut self, version: &'a str) -> Self {
        self.app = self
            .app
            .unset_setting(AppSettings::DisableVersion)
            .version(version);
        self
    }

    /// Sets the author(s) displayed in the help message.
    pub fn author(mut self, author: &'a str) -> Self {
        self.app = self.app.author(author);
        self
    }

    /// Sets the description displayed in the help message.
    pub fn about(mut self, about: &'a str) -> Self {
        self.app = self.app.about(about);
        self
    }

    /// Adds an argument.
    pub fn arg(mut self, arg: Arg<'a, 'a>) -> Self {
        self.app = self.app.arg(arg);
        self
    }

    /// Adds a subcommand.
    pub fn subcommand(mut self, subcommand: App<'a, 'a>) -> Self {
        self.app = self
            .app
            .setting(AppSettings::VersionlessSubcommands)
            .subcommand(subcommand);
        self
    }

    /// Parses a command line.
    ///
    /// The first item is the program name, as for `std::env::args_os()`.
    ///
    /// Invalid arguments and unknown log levels result in clap errors of the related kind;
    /// a log file that cannot be opened results in an error of kind `Io`.
    /// Help and version requests are also returned as errors, as clap does.
    pub fn parse_args<I, T>(&self, args: I) -> Result<ParsedArgs<'a>, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.app.clone().get_matches_from_safe(args)?;
        // level values already went through the arg validator
        let log_levels = matches
            .values_of(LOG_LEVEL_ARG)
            .map(|values| values.filter_map(|v| parse_level_option(v).ok()).collect())
            .unwrap_or_default();
        let log_files = matches
            .values_of(LOG_FILE_ARG)
            .map(|values| values.map(stage_log_file).collect::<Result<Vec<_>, _>>())
            .transpose()?
            .unwrap_or_default();
        Ok(ParsedArgs {
            matches,
            log_levels,
            log_files,
        })
    }
}

fn stage_log_file(option: &str) -> Result<LogOptionEntry<LogDestination>, clap::Error> {
    let (logger, destination) = split_option(option);
    LogDestination::open(destination)
        .map(|d| LogOptionEntry::new(logger, d))
        .map_err(|e| {
            clap::Error::with_description(
                &format!(r#"cannot open log file "{}": {}"#, destination, e),
                ErrorKind::Io,
            )
        })
}

/// The result of a successful command line parsing.
///
/// It dereferences to the clap matches, and holds the staged log options.
#[derive(Debug)]
pub struct ParsedArgs<'a> {
    matches: ArgMatches<'a>,
    log_levels: Vec<LogOptionEntry<LogLevel>>,
    log_files: Vec<LogOptionEntry<LogDestination>>,
}

impl<'a> ParsedArgs<'a> {
    /// The clap matches.
    pub fn matches(&self) -> &ArgMatches<'a> {
        &self.matches
    }

    /// The staged log levels, in command line order.
    pub fn log_levels(&self) -> &[LogOptionEntry<LogLevel>] {
        &self.log_levels
    }

    /// The staged log destinations, in command line order.
    pub fn log_files(&self) -> &[LogOptionEntry<LogDestination>] {
        &self.log_files
    }

    /// Applies the staged log options to a registry.
    ///
    /// The staged options are consumed, so calling this function again has no effect.
    pub fn apply_logging_opts(&mut self, registry: &Arc<LoggerRegistry>) {
        apply_log_options(
            registry,
            std::mem::take(&mut self.log_levels),
            std::mem::take(&mut self.log_files),
        )
    }
}

impl<'a> Deref for ParsedArgs<'a> {
    type Target = ArgMatches<'a>;

    fn deref(&self) -> &Self::Target {
        &self.matches
    }
}
