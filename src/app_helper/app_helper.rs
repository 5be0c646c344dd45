use crate::{
    cli_manager::{ArgumentParser, Command, ParsedArgs},
    logging::{default_registry, init_logging_config, install_log_bridge, Logger, LoggerRegistry},
};
use anyhow::Result;
use clap::Arg;
use std::{cell::Cell, ffi::OsString, sync::Arc, time::SystemTime};

/// The lifecycle of an application.
///
/// An application is `Constructed` until it is run;
/// it is then `Running`, and ends either `Finished` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// The application has not been run yet
    Constructed,
    /// The application is running
    Running,
    /// The application ended successfully
    Finished,
    /// The application ended with an error
    Failed,
}

/// The part shared by the applications: name, CLI parser, commands and loggers.
///
/// This helper should be used this way:
/// 1. create a new instance of this helper,
/// 2. set the app metadata, its arguments and its commands,
/// 3. give it to an [`Application`] or an [`AsyncApplication`] with the app main,
/// 4. call [`launch`].
///
/// The `-l/--log-level` and `-L/--log-file` options are always available;
/// they are applied to the registry of the helper before the main (or a command) is called.
///
/// [`Application`]: struct.Application.html
/// [`AsyncApplication`]: struct.AsyncApplication.html
/// [`launch`]: trait.Runner.html#method.launch
pub struct AppHelper<'a> {
    name: &'a str,
    parser: ArgumentParser<'a>,
    commands: Vec<Box<dyn Command<'a> + 'a>>,
    registry: Arc<LoggerRegistry>,
    log: Logger,
    state: Cell<AppState>,
}

impl<'a> AppHelper<'a> {
    /// Creates a new instance of the helper.
    ///
    /// The app logger is named after the app, in the process registry.
    ///
    /// # Arguments
    /// * `app_name` - the name of the application
    pub fn new(app_name: &'a str) -> Self {
        let registry = default_registry();
        AppHelper {
            name: app_name,
            parser: ArgumentParser::new(app_name, true),
            commands: vec![],
            log: registry.logger(Some(app_name)),
            registry,
            state: Cell::new(AppState::Constructed),
        }
    }

    /// Sets the version of the app, and enables the `--version` flag.
    pub fn version(mut self, version: &'a str) -> Self {
        self.parser = self.parser.version(version);
        self
    }

    /// Sets the author(s) of the app.
    /// Hint: you can add the mail address of the author at the end of its name for it to be displayed.
    pub fn author(mut self, author: &'a str) -> Self {
        self.parser = self.parser.author(author);
        self
    }

    /// Sets the textual description of the app.
    pub fn about(mut self, about: &'a str) -> Self {
        self.parser = self.parser.about(about);
        self
    }

    /// Adds a CLI argument to the app.
    pub fn arg(mut self, arg: Arg<'a, 'a>) -> Self {
        self.parser = self.parser.arg(arg);
        self
    }

    /// Adds a new command to the app. See [`Command`] for more information.
    ///
    /// [`Command`]: trait.Command.html
    pub fn add_command(mut self, command: Box<dyn Command<'a> + 'a>) -> Self {
        self.parser = self.parser.subcommand(command.clap_subcommand());
        self.commands.push(command);
        self
    }

    /// Replaces the logger registry the log options are applied to.
    pub fn with_registry(mut self, registry: Arc<LoggerRegistry>) -> Self {
        self.log = registry.logger(Some(self.name));
        self.registry = registry;
        self
    }

    /// Applies the default logging configuration of the app (see [`logging_config`]) to its registry.
    ///
    /// [`logging_config`]: logging/fn.logging_config.html
    pub fn with_logging_config(self) -> Result<Self> {
        init_logging_config(&self.registry, self.name)?;
        Ok(self)
    }

    /// The name of the app.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The logger of the app.
    pub fn log(&self) -> &Logger {
        &self.log
    }

    /// The logger registry of the app.
    pub fn registry(&self) -> &Arc<LoggerRegistry> {
        &self.registry
    }

    /// The current state of the app.
    pub fn state(&self) -> AppState {
        self.state.get()
    }

    /// Parses the CLI arguments and applies the log options.
    pub(crate) fn parse_args<I, T>(&self, args: I) -> Result<ParsedArgs<'a>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut args = self.parser.parse_args(args)?;
        args.apply_logging_opts(&self.registry);
        Ok(args)
    }

    /// Executes the command selected by the CLI arguments, if any.
    pub(crate) fn execute_command(&self, args: &ParsedArgs<'a>) -> Option<Result<i32>> {
        let (name, arg_matches) = args.subcommand();
        let arg_matches = arg_matches?;
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .map(|c| {
                self.log.debug(format_args!("executing command {}", name));
                c.execute(args, arg_matches)
            })
    }

    pub(crate) fn start(&self) {
        self.state.set(AppState::Running);
    }

    pub(crate) fn finish(&self, result: Result<i32>) -> Result<i32> {
        self.state.set(if result.is_ok() {
            AppState::Finished
        } else {
            AppState::Failed
        });
        result
    }
}

/// The way an application runs its main.
///
/// [`run_with_args`] runs the application and returns its exit status;
/// errors are returned unchanged.
/// [`launch`] is the process boundary: it runs the application and exits the process.
///
/// [`run_with_args`]: #tymethod.run_with_args
/// [`launch`]: #method.launch
pub trait Runner<'a> {
    /// Returns the helper of the application.
    fn helper(&self) -> &AppHelper<'a>;

    /// Runs the application given the CLI arguments (including the program name).
    fn run_with_args<I, T>(&self, args: I) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone;

    /// Launches the application.
    ///
    /// The command line arguments are read through `std::env::args_os()`.
    /// See [`launch_with_args`] for more information.
    ///
    /// [`launch_with_args`]: #method.launch_with_args
    fn launch(&self) -> ! {
        self.launch_with_args(std::env::args_os())
    }

    /// Launches the application with the given CLI arguments.
    ///
    /// Calling this function is probably the last thing you do in your app.
    /// The records of the `log` crate macros are sent to the app registry.
    /// The process exits with the status returned by the main.
    /// In case of a CLI error, the usage is displayed and the process exits with status 1
    /// (0 for help and version requests).
    /// If any other error is returned, the error stack is logged and a status of 1 is returned to the system.
    fn launch_with_args<I, T>(&self, args: I) -> !
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let helper = self.helper();
        install_log_bridge(helper.registry());
        let start_time = SystemTime::now();
        match self.run_with_args(args) {
            Ok(status) => {
                helper.log().info(format_args!(
                    "exiting with status {} after {:?}",
                    status,
                    start_time.elapsed().unwrap_or_default()
                ));
                std::process::exit(status)
            }
            Err(e) => {
                if let Some(clap_error) = e.downcast_ref::<clap::Error>() {
                    clap_error.exit()
                }
                helper.log().error(format_args!("an error occurred: {}", e));
                e.chain()
                    .skip(1)
                    .for_each(|err| helper.log().error(format_args!("caused by: {}", err)));
                std::process::exit(1)
            }
        }
    }
}
