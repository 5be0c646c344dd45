use super::{
    handler::{Formatter, Handler, LogDestination, DEFAULT_FORMAT},
    level::LogLevel,
    registry::{LoggerRegistry, ROOT_LOGGER_NAME},
};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path, str::FromStr, sync::Arc};

/// Returns the default logging configuration for a package.
///
/// The configuration is a TOML document that can be read by [`LoggingConfig`].
/// It defines a `default` handler writing to the standard error,
/// sets the root logger to `WARNING` with this handler,
/// and declares a logger for the package which inherits from the root.
///
/// [`LoggingConfig`]: struct.LoggingConfig.html
pub fn logging_config(pkg_name: &str) -> String {
    format!(
        r#"[formatters.default]
format = "<{{name}}> [{{level}}]: {{message}}"

[handlers.default]
target = "stderr"
formatter = "default"
level = "NOTSET"

[loggers.{root}]
level = "WARNING"
handlers = ["default"]

[loggers."{pkg_name}"]
level = "NOTSET"
handlers = []
propagate = true
"#,
        root = ROOT_LOGGER_NAME,
        pkg_name = pkg_name.replace('\\', "\\\\").replace('"', "\\\""),
    )
}

/// Renders the default logging configuration of a package and applies it to a registry.
///
/// The rendered configuration is returned.
pub fn init_logging_config(registry: &Arc<LoggerRegistry>, pkg_name: &str) -> Result<String> {
    let config = logging_config(pkg_name);
    LoggingConfig::from_str(&config)?.apply(registry)?;
    Ok(config)
}

/// Reads a logging configuration file and applies it to a registry.
pub fn file_config<P>(registry: &Arc<LoggerRegistry>, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!(r#"while reading logging configuration "{}""#, path.display()))?;
    LoggingConfig::from_str(&content)
        .and_then(|c| c.apply(registry))
        .with_context(|| format!(r#"while loading logging configuration "{}""#, path.display()))
}

/// The definition of a formatter in a logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatterConfig {
    /// the format template
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

/// The definition of a handler in a logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
    /// `stdout`, `stderr`, `null` or a file path
    pub target: String,
    /// the name of the formatter; the default format is used if absent
    pub formatter: Option<String>,
    /// the minimal level of the handled records
    pub level: Option<LogLevel>,
}

/// The definition of a logger in a logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// the level of the logger
    pub level: Option<LogLevel>,
    /// the names of the handlers, which replace the current ones
    #[serde(default)]
    pub handlers: Vec<String>,
    /// whether records go to the ancestors' handlers
    pub propagate: Option<bool>,
}

/// A logging configuration, made of named formatters, handlers and loggers.
///
/// The logger named `root` is the root logger.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// the formatters, by name
    #[serde(default)]
    pub formatters: BTreeMap<String, FormatterConfig>,
    /// the handlers, by name
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerConfig>,
    /// the loggers, by logger name
    #[serde(default)]
    pub loggers: BTreeMap<String, LoggerConfig>,
}

impl FromStr for LoggingConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).context("while parsing logging configuration")
    }
}

impl LoggingConfig {
    /// Applies the configuration to a registry.
    ///
    /// All the references (formatters, handlers) and file targets are checked before any logger is modified.
    /// Each configured logger gets its handlers replaced; a handler used by several loggers is shared.
    pub fn apply(&self, registry: &Arc<LoggerRegistry>) -> Result<()> {
        let formatters = self
            .formatters
            .iter()
            .map(|(name, f)| (name.as_str(), Arc::new(Formatter::new(&f.format))))
            .collect::<BTreeMap<&str, Arc<Formatter>>>();
        let default_formatter = Arc::new(Formatter::default());
        let mut handlers = BTreeMap::new();
        for (name, h) in self.handlers.iter() {
            let formatter = match &h.formatter {
                Some(f) => formatters
                    .get(f.as_str())
                    .cloned()
                    .ok_or_else(|| {
                        anyhow!(r#"undefined formatter "{}" in handler "{}""#, f, name)
                    })?,
                None => Arc::clone(&default_formatter),
            };
            let destination = LogDestination::open(&h.target).with_context(|| {
                format!(r#"while opening target "{}" of handler "{}""#, h.target, name)
            })?;
            let handler = Handler::new(destination, formatter)
                .with_level(h.level.unwrap_or(LogLevel::NotSet));
            handlers.insert(name.as_str(), Arc::new(handler));
        }
        for (name, l) in self.loggers.iter() {
            let undefined = l.handlers.iter().find(|h| !handlers.contains_key(h.as_str()));
            if let Some(h) = undefined {
                return Err(anyhow!(r#"undefined handler "{}" in logger "{}""#, h, name));
            }
        }
        for (name, l) in self.loggers.iter() {
            let logger = if name == ROOT_LOGGER_NAME {
                registry.logger(None)
            } else {
                registry.logger(Some(name.as_str()))
            };
            if let Some(level) = l.level {
                logger.set_level(level);
            }
            if let Some(propagate) = l.propagate {
                logger.set_propagate(propagate);
            }
            logger.clear_handlers();
            l.handlers
                .iter()
                .filter_map(|h| handlers.get(h.as_str()))
                .for_each(|h| logger.add_shared_handler(Arc::clone(h)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::{prelude::FileWriteStr, NamedTempFile, TempDir};

    #[test]
    fn test_template_parses() {
        let config = LoggingConfig::from_str(&logging_config("INl3agueWitS4t4n")).unwrap();
        assert_eq!(1, config.handlers.len());
        assert_eq!(
            Some(LogLevel::Warning),
            config.loggers[ROOT_LOGGER_NAME].level
        );
        assert_eq!(
            Some(LogLevel::NotSet),
            config.loggers["INl3agueWitS4t4n"].level
        );
    }

    #[test]
    fn test_template_dotted_name() {
        let config = LoggingConfig::from_str(&logging_config("nicfit.app")).unwrap();
        assert!(config.loggers.contains_key("nicfit.app"));
    }

    #[test]
    fn test_init_logging_config() {
        let registry = Arc::new(LoggerRegistry::default());
        let config = init_logging_config(&registry, "INl3agueWitS4t4n").unwrap();
        assert!(config.contains("INl3agueWitS4t4n"));
        let root = registry.logger(None);
        assert_eq!(LogLevel::Warning, root.level());
        assert_eq!(1, root.handlers().len());
        assert_eq!("stderr", root.handlers()[0].description());
        let pkg = registry.logger(Some("INl3agueWitS4t4n"));
        assert!(pkg.handlers().is_empty());
        assert!(pkg.propagate());
    }

    #[test]
    fn test_apply_replaces_handlers() {
        let registry = Arc::new(LoggerRegistry::default());
        init_logging_config(&registry, "pkg").unwrap();
        init_logging_config(&registry, "pkg").unwrap();
        assert_eq!(1, registry.logger(None).handlers().len());
    }

    #[test]
    fn test_undefined_handler() {
        let registry = Arc::new(LoggerRegistry::default());
        let config = LoggingConfig::from_str(
            r#"
            [loggers.foo]
            level = "DEBUG"
            handlers = ["missing"]
            "#,
        )
        .unwrap();
        assert!(config.apply(&registry).is_err());
        assert_eq!(LogLevel::NotSet, registry.logger(Some("foo")).level());
    }

    #[test]
    fn test_undefined_formatter() {
        let registry = Arc::new(LoggerRegistry::default());
        let config = LoggingConfig::from_str(
            r#"
            [handlers.h]
            target = "null"
            formatter = "missing"
            "#,
        )
        .unwrap();
        assert!(config.apply(&registry).is_err());
    }

    #[test]
    fn test_unknown_level() {
        assert!(LoggingConfig::from_str(
            r#"
            [loggers.foo]
            level = "LOUD"
            "#,
        )
        .is_err());
    }

    #[test]
    fn test_file_config() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("logs").join("app.log");
        let file = NamedTempFile::new("logging.toml").unwrap();
        file.write_str(&format!(
            r#"
            [formatters.short]
            format = "{{level}} {{message}}"

            [handlers.file]
            target = "{}"
            formatter = "short"

            [loggers.app]
            level = "verbose"
            handlers = ["file"]
            propagate = false
            "#,
            log_path.display().to_string().replace('\\', "\\\\")
        ))
        .unwrap();
        let registry = Arc::new(LoggerRegistry::default());
        file_config(&registry, file.path()).unwrap();
        let logger = registry.logger(Some("app"));
        logger.verbose("hello");
        assert_eq!("VERBOSE hello\n", fs::read_to_string(&log_path).unwrap());
        file.close().unwrap();
    }

    #[test]
    fn test_file_config_missing_file() {
        let registry = Arc::new(LoggerRegistry::default());
        let dir = TempDir::new().unwrap();
        assert!(file_config(&registry, dir.path().join("missing.toml")).is_err());
    }
}
