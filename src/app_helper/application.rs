use super::app_helper::{AppHelper, Runner};
use crate::cli_manager::ParsedArgs;
use anyhow::Result;
use std::ffi::OsString;

/// The main function of a synchronous application.
///
/// It is implemented by closures taking the parsed arguments and returning the exit status.
pub trait Main<'a> {
    /// Executes the application main, and returns its exit status.
    fn main(&self, args: &ParsedArgs<'a>) -> Result<i32>;
}

impl<'a, F> Main<'a> for F
where
    F: Fn(&ParsedArgs<'a>) -> Result<i32>,
{
    fn main(&self, args: &ParsedArgs<'a>) -> Result<i32> {
        self(args)
    }
}

/// An application running its main on the calling thread.
///
/// ```no_run
/// use appstrap::{AppHelper, Application, ParsedArgs, Runner};
///
/// let app = Application::new(
///     AppHelper::new("my-app").version("1.0.0"),
///     |_args: &ParsedArgs| -> anyhow::Result<i32> {
///         println!("Hello!");
///         Ok(0)
///     },
/// );
/// app.launch();
/// ```
pub struct Application<'a> {
    helper: AppHelper<'a>,
    main: Box<dyn Main<'a> + 'a>,
}

impl<'a> Application<'a> {
    /// Builds an application given its helper and its main.
    pub fn new<M>(helper: AppHelper<'a>, main: M) -> Self
    where
        M: Main<'a> + 'a,
    {
        Application {
            helper,
            main: Box::new(main),
        }
    }

    /// Parses the CLI arguments, applies the log options and executes the main (or the selected command).
    pub fn main<I, T>(&self, args: I) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = self.helper.parse_args(args)?;
        match self.helper.execute_command(&args) {
            Some(result) => result,
            None => self.main.main(&args),
        }
    }
}

impl<'a> Runner<'a> for Application<'a> {
    fn helper(&self) -> &AppHelper<'a> {
        &self.helper
    }

    fn run_with_args<I, T>(&self, args: I) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.helper.log().debug("running the application");
        self.helper.start();
        let result = self.main(args);
        self.helper.finish(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_helper::AppState,
        logging::{LogLevel, LoggerRegistry},
    };
    use anyhow::{anyhow, Context};
    use clap::Arg;
    use std::{cell::RefCell, rc::Rc, sync::Arc};

    fn helper() -> AppHelper<'static> {
        AppHelper::new("app")
            .with_registry(Arc::new(LoggerRegistry::default()))
            .arg(Arg::with_name("status").long("status").takes_value(true))
    }

    fn status_main(args: &ParsedArgs) -> Result<i32> {
        args.value_of("status")
            .map(|s| s.parse::<i32>().context("while reading status"))
            .transpose()
            .map(|s| s.unwrap_or(0))
    }

    #[test]
    fn test_run_returns_main_status() {
        let app = Application::new(helper(), status_main);
        assert_eq!(AppState::Constructed, app.helper().state());
        assert_eq!(3, app.run_with_args(vec!["app", "--status", "3"]).unwrap());
        assert_eq!(AppState::Finished, app.helper().state());
    }

    #[test]
    fn test_main_error_propagates() {
        let app = Application::new(helper(), |_: &ParsedArgs| -> Result<i32> {
            Err(anyhow!("Vision")).context("InTheBlinkOfAnEye")
        });
        let e = app.run_with_args(vec!["app"]).unwrap_err();
        assert_eq!("InTheBlinkOfAnEye", e.to_string());
        assert_eq!("Vision", e.root_cause().to_string());
        assert_eq!(AppState::Failed, app.helper().state());
    }

    #[test]
    fn test_cli_error() {
        let app = Application::new(helper(), status_main);
        let e = app.run_with_args(vec!["app", "-l"]).unwrap_err();
        assert!(e.downcast_ref::<clap::Error>().is_some());
        assert_eq!(AppState::Failed, app.helper().state());
    }

    #[test]
    fn test_log_options_applied_before_main() {
        let seen = Rc::new(RefCell::new(None));
        let seen_in_main = Rc::clone(&seen);
        let registry = Arc::new(LoggerRegistry::default());
        let app = Application::new(
            AppHelper::new("app").with_registry(Arc::clone(&registry)),
            move |_: &ParsedArgs| -> Result<i32> {
                *seen_in_main.borrow_mut() = Some(registry.logger(Some("X")).effective_level());
                Ok(0)
            },
        );
        app.main(vec!["app", "-l", "debug", "--log-level", "warning", "--log-level=X:error"])
            .unwrap();
        assert_eq!(Some(LogLevel::Error), *seen.borrow());
        assert_eq!(
            LogLevel::Warning,
            app.helper().registry().logger(None).effective_level()
        );
    }

    #[test]
    fn test_no_logger_modified_on_unknown_level() {
        let registry = Arc::new(LoggerRegistry::default());
        let app = Application::new(
            AppHelper::new("app").with_registry(Arc::clone(&registry)),
            status_main,
        );
        let e = app
            .main(vec!["app", "-l", "X:debug", "-l", "Vision-InTheBlinkOfAnEye"])
            .unwrap_err();
        assert_eq!(
            clap::ErrorKind::ValueValidation,
            e.downcast_ref::<clap::Error>().unwrap().kind
        );
        assert_eq!(LogLevel::NotSet, registry.logger(Some("X")).level());
        assert_eq!(LogLevel::Warning, registry.logger(None).level());
    }

    #[test]
    fn test_main_not_called_on_cli_error() {
        let called = Rc::new(RefCell::new(false));
        let called_in_main = Rc::clone(&called);
        let app = Application::new(helper(), move |_: &ParsedArgs| -> Result<i32> {
            *called_in_main.borrow_mut() = true;
            Ok(0)
        });
        app.main(vec!["app", "-l", "Vision-InTheBlinkOfAnEye"])
            .unwrap_err();
        assert!(!*called.borrow());
    }
}
