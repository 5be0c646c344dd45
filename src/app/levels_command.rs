use anyhow::Result;
use appstrap::{AppSettings, Arg, ArgMatches, Command, LogLevel, ParsedArgs, SubCommand};
use strum::IntoEnumIterator;

const CMD_NAME: &str = "levels";

const ARG_WITH_VALUES: &str = "WITH_VALUES";

pub(crate) struct LevelsCommand;

impl LevelsCommand {
    pub(crate) fn new() -> Self {
        LevelsCommand
    }
}

impl<'a> Command<'a> for LevelsCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> appstrap::App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Displays the log levels accepted by the -l option")
            .setting(AppSettings::DisableVersion)
            .arg(
                Arg::with_name(ARG_WITH_VALUES)
                    .long("with-values")
                    .help("display the numeric value of each level"),
            )
    }

    fn execute(&self, _args: &ParsedArgs<'a>, arg_matches: &ArgMatches<'a>) -> Result<i32> {
        let with_values = arg_matches.is_present(ARG_WITH_VALUES);
        let levels = LogLevel::iter().fold(String::new(), |mut acc, l| {
            if !acc.is_empty() {
                acc.push(',');
            }
            if with_values {
                acc.push_str(&format!("{}={}", l, l.value()));
            } else {
                acc.push_str(&l.to_string());
            }
            acc
        });
        println!("[{}]", levels);
        Ok(0)
    }
}
