use super::app_helper::{AppHelper, Runner};
use crate::{cli_manager::ParsedArgs, logging::Logger};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::{ffi::OsString, time::Duration};

const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(1);

/// The main function of an asynchronous application.
#[async_trait(?Send)]
pub trait AsyncMain<'a> {
    /// Executes the application main, and returns its exit status.
    async fn main(&self, args: &ParsedArgs<'a>) -> Result<i32>;
}

/// An application whose main is run by a single-threaded `tokio` runtime.
///
/// The runtime is created when the application is run, and dropped when the main returns.
/// When the monitor is enabled (which is the default), the runtime metrics are logged
/// at the `DEBUG` level on the app logger while the main runs.
pub struct AsyncApplication<'a> {
    helper: AppHelper<'a>,
    main: Box<dyn AsyncMain<'a> + 'a>,
    with_monitor: bool,
    monitor_interval: Duration,
}

impl<'a> AsyncApplication<'a> {
    /// Builds an application given its helper and its main.
    pub fn new<M>(helper: AppHelper<'a>, main: M) -> Self
    where
        M: AsyncMain<'a> + 'a,
    {
        AsyncApplication {
            helper,
            main: Box::new(main),
            with_monitor: true,
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
        }
    }

    /// Enables or disables the runtime monitor.
    pub fn with_monitor(mut self, with_monitor: bool) -> Self {
        self.with_monitor = with_monitor;
        self
    }

    /// Sets the time between two reports of the runtime monitor.
    pub fn monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Parses the CLI arguments, applies the log options and executes the main (or the selected command).
    pub async fn main<I, T>(&self, args: I) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = self.helper.parse_args(args)?;
        match self.helper.execute_command(&args) {
            Some(result) => result,
            None => self.main.main(&args).await,
        }
    }
}

impl<'a> Runner<'a> for AsyncApplication<'a> {
    fn helper(&self) -> &AppHelper<'a> {
        &self.helper
    }

    fn run_with_args<I, T>(&self, args: I) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.helper.log().debug(format_args!(
            "running the application in an async runtime (monitor: {})",
            self.with_monitor
        ));
        self.helper.start();
        let result = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("while building the async runtime")
            .and_then(|runtime| {
                runtime.block_on(async {
                    let monitor = self.with_monitor.then(|| {
                        tokio::spawn(monitor_runtime(
                            self.helper.log().clone(),
                            self.monitor_interval,
                        ))
                    });
                    let result = self.main(args).await;
                    if let Some(m) = monitor {
                        m.abort();
                    }
                    result
                })
            });
        self.helper.finish(result)
    }
}

async fn monitor_runtime(log: Logger, interval: Duration) {
    let mut ticks = tokio::time::interval(interval);
    loop {
        ticks.tick().await;
        let metrics = tokio::runtime::Handle::current().metrics();
        log.debug(format_args!(
            "runtime monitor: {} worker(s), {} alive task(s)",
            metrics.num_workers(),
            metrics.num_alive_tasks()
        ));
    }
}
