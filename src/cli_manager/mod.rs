//! Command line handling: the parser, the log options and the subcommands.

mod argument_parser;
pub use argument_parser::ArgumentParser;
pub use argument_parser::ParsedArgs;

mod command;
pub use command::Command;

mod log_options;
pub use log_options::apply_log_options;
pub use log_options::log_file_cli_arg;
pub use log_options::log_level_cli_arg;
pub use log_options::split_option;
pub use log_options::LogOptionEntry;
