use app::{demo_args, demo_main, AuthorsCommand, LevelsCommand};
use appstrap::{AppHelper, Application, Runner};

mod app;

fn main() {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let authors = option_env!("CARGO_PKG_AUTHORS").unwrap_or("unknown authors");
    let helper = demo_args().into_iter().fold(
        AppHelper::new(app_name)
            .version(app_version)
            .author(authors)
            .about("Appstrap demo, an app showing the log options."),
        |h, a| h.arg(a),
    );
    let helper = helper
        .add_command(Box::new(AuthorsCommand::new(app_name, app_version, authors)))
        .add_command(Box::new(LevelsCommand::new()));
    Application::new(helper, demo_main).launch()
}
