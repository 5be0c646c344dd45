mod authors_command;
pub(crate) use authors_command::AuthorsCommand;

mod demo_main;
pub(crate) use demo_main::demo_args;
pub(crate) use demo_main::demo_main;

mod levels_command;
pub(crate) use levels_command::LevelsCommand;
