use anyhow::Result;
use appstrap::{get_logger, log_verbose, AppSettings, ArgMatches, Command, ParsedArgs, SubCommand};

const CMD_NAME: &str = "authors";

/// Prints the app name and version, then one author per line.
pub(crate) struct AuthorsCommand<'a> {
    app_name: &'a str,
    app_version: &'a str,
    authors: Vec<&'a str>,
}

impl<'a> AuthorsCommand<'a> {
    /// Builds the command; `authors` is colon-separated, as in `CARGO_PKG_AUTHORS`.
    pub(crate) fn new(app_name: &'a str, app_version: &'a str, authors: &'a str) -> Self {
        AuthorsCommand {
            app_name,
            app_version,
            authors: authors
                .split(':')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }
}

impl<'a> Command<'a> for AuthorsCommand<'a> {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> appstrap::App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Displays app version and authors")
            .setting(AppSettings::DisableVersion)
    }

    fn execute(&self, _args: &ParsedArgs<'a>, _arg_matches: &ArgMatches<'a>) -> Result<i32> {
        let logger = get_logger(Some(self.app_name));
        log_verbose!(logger, "{} author(s) registered", self.authors.len());
        println!("{} {}", self.app_name, self.app_version);
        self.authors.iter().for_each(|a| println!("  {}", a));
        Ok(0)
    }
}
