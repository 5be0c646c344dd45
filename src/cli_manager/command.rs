use super::argument_parser::ParsedArgs;
use anyhow::Result;
use clap::{App, ArgMatches};

/// A trait for the subcommands of an application.
///
/// Commands provide their own CLI argument requirements (using clap)
/// and execute themselves given the CLI arguments.
///
/// Each command must have a unique name.
/// The log options are not handled by the commands but by the application,
/// and are applied before a command is executed.
pub trait Command<'a> {
    /// Returns the name of the command.
    fn name(&self) -> &str;

    /// Returns the clap subcommand describing the available CLI arguments for this command.
    fn clap_subcommand(&self) -> App<'a, 'a>;

    /// Executes the command given its arguments, and returns the exit status of the application.
    ///
    /// # Arguments
    ///
    /// * `args` - the arguments of the whole application
    /// * `arg_matches` - the arguments for the command
    fn execute(&self, args: &ParsedArgs<'a>, arg_matches: &ArgMatches<'a>) -> Result<i32>;
}
