use anyhow::{anyhow, Context, Result};
use appstrap::{get_logger, log_verbose, Arg, ParsedArgs};
use log::info;

const DEMO_LOGGER: &str = "appstrap.demo";

const ARG_EXIT_CODE: &str = "EXIT_CODE";
const ARG_FAIL: &str = "FAIL";

pub(crate) fn demo_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_EXIT_CODE)
            .long("exit-code")
            .takes_value(true)
            .empty_values(false)
            .help("the exit status of the demo")
            .required(false),
        Arg::with_name(ARG_FAIL)
            .long("fail")
            .help("makes the demo fail")
            .conflicts_with(ARG_EXIT_CODE),
    ]
}

pub(crate) fn demo_main(args: &ParsedArgs) -> Result<i32> {
    let logger = get_logger(Some(DEMO_LOGGER));
    logger.debug("starting the demo");
    log_verbose!(logger, "logger {} is at level {}", logger.name(), logger.effective_level());
    logger.info("the demo logs a message at each level");
    logger.warning("this is a warning");
    info!("this one comes from the log crate");
    if args.is_present(ARG_FAIL) {
        return Err(anyhow!("failure requested on the command line"))
            .context("while running the demo");
    }
    let status = args
        .value_of(ARG_EXIT_CODE)
        .map(|s| s.parse::<i32>())
        .transpose()
        .context("while reading the exit code")?
        .unwrap_or(0);
    println!("done");
    Ok(status)
}
