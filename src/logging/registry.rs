use super::{
    handler::{Handler, LogRecord},
    level::LogLevel,
};
use lazy_static::lazy_static;
use std::{
    collections::HashMap,
    fmt::Display,
    sync::{Arc, Once, PoisonError, RwLock},
};

/// The name displayed for the root logger.
pub const ROOT_LOGGER_NAME: &str = "root";

/// The level of the root logger when nothing has been configured.
pub const DEFAULT_ROOT_LEVEL: LogLevel = LogLevel::Warning;

lazy_static! {
    static ref DEFAULT_REGISTRY: Arc<LoggerRegistry> = Arc::new(LoggerRegistry::default());
}

static LOG_BRIDGE_INIT: Once = Once::new();

struct LoggerNode {
    level: LogLevel,
    handlers: Vec<Arc<Handler>>,
    propagate: bool,
}

impl LoggerNode {
    fn new(level: LogLevel) -> Self {
        LoggerNode {
            level,
            handlers: vec![],
            propagate: true,
        }
    }
}

/// The set of loggers of a process, organized as a hierarchy.
///
/// Loggers are identified by dot-separated names: `a.b` is a child of `a`, which is a child of the root logger.
/// A logger with no level (`NOTSET`) uses the level of its closest configured ancestor.
/// Records emitted by a logger are given to its handlers, then to the ones of its ancestors
/// until a logger that does not propagate is met.
///
/// Registries are usually shared through an `Arc`; [`default_registry`] returns the one of the process.
///
/// [`default_registry`]: fn.default_registry.html
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, LoggerNode>>,
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        let mut loggers = HashMap::new();
        loggers.insert(String::new(), LoggerNode::new(DEFAULT_ROOT_LEVEL));
        LoggerRegistry {
            loggers: RwLock::new(loggers),
        }
    }
}

impl LoggerRegistry {
    /// Returns the logger with the given name, creating it if needed.
    ///
    /// `None` and the empty string both designate the root logger.
    pub fn logger(self: &Arc<Self>, name: Option<&str>) -> Logger {
        let key = name.unwrap_or_default().to_string();
        if !self.read_nodes().contains_key(&key) {
            self.write_nodes()
                .entry(key.clone())
                .or_insert_with(|| LoggerNode::new(LogLevel::NotSet));
        }
        Logger {
            key,
            registry: Arc::clone(self),
        }
    }

    /// Returns the names of the loggers created so far, sorted.
    pub fn logger_names(&self) -> Vec<String> {
        let mut names = self
            .read_nodes()
            .keys()
            .map(|k| display_name(k).to_string())
            .collect::<Vec<String>>();
        names.sort();
        names
    }

    fn read_nodes(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, LoggerNode>> {
        self.loggers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_nodes(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, LoggerNode>> {
        self.loggers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads the state of a logger; unknown loggers are not created.
    fn read_node<F, R>(&self, key: &str, f: F) -> R
    where
        F: FnOnce(Option<&LoggerNode>) -> R,
    {
        f(self.read_nodes().get(key))
    }

    fn with_node<F, R>(&self, key: &str, f: F) -> R
    where
        F: FnOnce(&mut LoggerNode) -> R,
    {
        let mut nodes = self.write_nodes();
        let node = nodes
            .entry(key.to_string())
            .or_insert_with(|| LoggerNode::new(LogLevel::NotSet));
        f(node)
    }

    fn effective_level(&self, key: &str) -> LogLevel {
        let nodes = self.read_nodes();
        lineage(key)
            .filter_map(|k| nodes.get(k))
            .map(|n| n.level)
            .find(|l| *l != LogLevel::NotSet)
            .unwrap_or(LogLevel::NotSet)
    }

    fn emit(&self, key: &str, record: &LogRecord) {
        let handlers = {
            let nodes = self.read_nodes();
            let mut handlers = vec![];
            for node in lineage(key).filter_map(|k| nodes.get(k)) {
                handlers.extend(node.handlers.iter().cloned());
                if !node.propagate {
                    break;
                }
            }
            handlers
        };
        if handlers.is_empty() {
            if record.level() >= LogLevel::Warning {
                eprintln!("{}", record.message());
            }
            return;
        }
        handlers.iter().for_each(|h| h.handle(record));
    }
}

/// Returns the registry shared by the whole process.
pub fn default_registry() -> Arc<LoggerRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

/// Returns a logger of the process registry.
///
/// `None` designates the root logger.
pub fn get_logger(name: Option<&str>) -> Logger {
    DEFAULT_REGISTRY.logger(name)
}

fn display_name(key: &str) -> &str {
    if key.is_empty() {
        ROOT_LOGGER_NAME
    } else {
        key
    }
}

/// Iterates over a logger key and the keys of its ancestors, ending with the root key.
fn lineage(key: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(key);
    std::iter::from_fn(move || {
        let current = next?;
        next = if current.is_empty() {
            None
        } else {
            Some(current.rfind('.').map(|i| &current[..i]).unwrap_or(""))
        };
        Some(current)
    })
}

/// A handle on a logger of a registry.
///
/// Handles are cheap to clone; all the handles with the same name share the same state.
#[derive(Clone)]
pub struct Logger {
    key: String,
    registry: Arc<LoggerRegistry>,
}

impl Logger {
    /// The name of the logger (`root` for the root logger).
    pub fn name(&self) -> &str {
        display_name(&self.key)
    }

    /// Returns `true` iff this is the root logger.
    pub fn is_root(&self) -> bool {
        self.key.is_empty()
    }

    /// Sets the level of this logger.
    pub fn set_level(&self, level: LogLevel) {
        self.registry.with_node(&self.key, |n| n.level = level)
    }

    /// The level set on this logger, which may be `NOTSET`.
    pub fn level(&self) -> LogLevel {
        self.registry
            .read_node(&self.key, |n| n.map_or(LogLevel::NotSet, |n| n.level))
    }

    /// The level that actually applies to this logger, taking its ancestors into account.
    pub fn effective_level(&self) -> LogLevel {
        self.registry.effective_level(&self.key)
    }

    /// Returns `true` iff records of the given level are emitted by this logger.
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level >= self.effective_level()
    }

    /// Sets whether records should be given to the ancestors' handlers.
    pub fn set_propagate(&self, propagate: bool) {
        self.registry.with_node(&self.key, |n| n.propagate = propagate)
    }

    /// Returns `true` iff the records are given to the ancestors' handlers.
    pub fn propagate(&self) -> bool {
        self.registry
            .read_node(&self.key, |n| n.map_or(true, |n| n.propagate))
    }

    /// Attaches a handler to this logger.
    pub fn add_handler(&self, handler: Handler) {
        self.add_shared_handler(Arc::new(handler))
    }

    /// Attaches a handler that may also be attached to other loggers.
    pub fn add_shared_handler(&self, handler: Arc<Handler>) {
        self.registry
            .with_node(&self.key, |n| n.handlers.push(handler))
    }

    /// Detaches all the handlers of this logger.
    pub fn clear_handlers(&self) {
        self.registry.with_node(&self.key, |n| n.handlers.clear())
    }

    /// Returns the handlers attached to this logger (not the ones of its ancestors).
    pub fn handlers(&self) -> Vec<Arc<Handler>> {
        self.registry
            .read_node(&self.key, |n| n.map(|n| n.handlers.clone()).unwrap_or_default())
    }

    /// Emits a message at the given level.
    pub fn log<M>(&self, level: LogLevel, message: M)
    where
        M: Display,
    {
        if !self.is_enabled_for(level) {
            return;
        }
        let record = LogRecord::new(self.name(), level, message);
        self.registry.emit(&self.key, &record);
    }

    /// Emits a message at the `DEBUG` level.
    pub fn debug<M: Display>(&self, message: M) {
        self.log(LogLevel::Debug, message)
    }

    /// Emits a message at the `VERBOSE` level.
    pub fn verbose<M: Display>(&self, message: M) {
        self.log(LogLevel::Verbose, message)
    }

    /// Emits a message at the `INFO` level.
    pub fn info<M: Display>(&self, message: M) {
        self.log(LogLevel::Info, message)
    }

    /// Emits a message at the `WARNING` level.
    pub fn warning<M: Display>(&self, message: M) {
        self.log(LogLevel::Warning, message)
    }

    /// Emits a message at the `ERROR` level.
    pub fn error<M: Display>(&self, message: M) {
        self.log(LogLevel::Error, message)
    }

    /// Emits a message at the `CRITICAL` level.
    pub fn critical<M: Display>(&self, message: M) {
        self.log(LogLevel::Critical, message)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").field("name", &self.name()).finish()
    }
}

/// Emits a formatted message at the `VERBOSE` level.
///
/// ```
/// use appstrap::{log_verbose, LoggerRegistry};
/// use std::sync::Arc;
///
/// let logger = Arc::new(LoggerRegistry::default()).logger(Some("app"));
/// log_verbose!(logger, "read {} files", 3);
/// ```
#[macro_export]
macro_rules! log_verbose {
    ($logger:expr, $($arg:tt)+) => {
        $logger.verbose(format_args!($($arg)+))
    };
}

struct LogBridge(Arc<LoggerRegistry>);

// Records of the log crate do not create loggers in the registry.
impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let key = metadata.target().replace("::", ".");
        LogLevel::from(metadata.level()) >= self.0.effective_level(&key)
    }

    fn log(&self, record: &log::Record) {
        let key = record.target().replace("::", ".");
        let level = LogLevel::from(record.level());
        if level < self.0.effective_level(&key) {
            return;
        }
        let record = LogRecord::new(display_name(&key), level, record.args());
        self.0.emit(&key, &record);
    }

    fn flush(&self) {}
}

/// Sends the records of the `log` crate macros to the loggers of a registry.
///
/// The target of the records is used as the logger name, with `::` replaced by dots.
/// Only the first call has an effect.
pub fn install_log_bridge(registry: &Arc<LoggerRegistry>) {
    let registry = Arc::clone(registry);
    LOG_BRIDGE_INIT.call_once(|| {
        fern::Dispatch::new()
            .level(log::LevelFilter::Trace)
            .chain(Box::new(LogBridge(registry)) as Box<dyn log::Log>)
            .apply()
            .unwrap_or(());
    });
}
