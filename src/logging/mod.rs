//! Loggers with a `VERBOSE` level, their handlers and their configuration.

mod config;
pub use config::file_config;
pub use config::init_logging_config;
pub use config::logging_config;
pub use config::FormatterConfig;
pub use config::HandlerConfig;
pub use config::LoggerConfig;
pub use config::LoggingConfig;

mod handler;
pub use handler::Formatter;
pub use handler::Handler;
pub use handler::LogDestination;
pub use handler::LogRecord;
pub use handler::DEFAULT_FORMAT;

mod level;
pub use level::LogLevel;

mod registry;
pub use registry::default_registry;
pub use registry::get_logger;
pub use registry::install_log_bridge;
pub use registry::Logger;
pub use registry::LoggerRegistry;
pub use registry::DEFAULT_ROOT_LEVEL;
pub use registry::ROOT_LOGGER_NAME;
