use super::level::LogLevel;
use chrono::{DateTime, Local};
use fern::colors::{Color, ColoredLevelConfig};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::{
    fmt::Display,
    fs::{self, File},
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

/// The format used when no other one is given.
pub const DEFAULT_FORMAT: &str = "[{level}] {time} <{name}>: {message}";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

lazy_static! {
    static ref PLACEHOLDER_PATTERN: Regex = Regex::new(r"\{([a-z]+)\}").unwrap();
}

/// A message emitted by a logger, as received by the handlers.
#[derive(Debug, Clone)]
pub struct LogRecord {
    name: String,
    level: LogLevel,
    message: String,
    time: DateTime<Local>,
    thread: String,
}

impl LogRecord {
    /// Builds a record for the logger with the given name, timestamped now.
    pub fn new<M>(name: &str, level: LogLevel, message: M) -> Self
    where
        M: Display,
    {
        LogRecord {
            name: name.to_string(),
            level,
            message: message.to_string(),
            time: Local::now(),
            thread: std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
        }
    }

    /// The name of the logger the record was emitted by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The level of the record.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// The message of the record.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Turns records into lines of text.
///
/// The format is a template in which the following placeholders are replaced:
/// `{name}`, `{level}`, `{levelno}`, `{message}`, `{time}` and `{thread}`.
/// Unknown placeholders are kept as is.
#[derive(Clone)]
pub struct Formatter {
    format: String,
    colors: ColoredLevelConfig,
}

impl Formatter {
    /// Builds a formatter given its template.
    pub fn new(format: &str) -> Self {
        Formatter {
            format: format.to_string(),
            colors: ColoredLevelConfig::new().info(Color::Cyan),
        }
    }

    /// Formats a record.
    ///
    /// If `colored` is set, the level name is surrounded by terminal color codes.
    pub fn format(&self, record: &LogRecord, colored: bool) -> String {
        PLACEHOLDER_PATTERN
            .replace_all(&self.format, |c: &Captures| match &c[1] {
                "name" => record.name.clone(),
                "level" if colored => {
                    let color = self.colors.get_color(&record.level.to_log_level());
                    format!("\x1B[{}m{}\x1B[0m", color.to_fg_str(), record.level)
                }
                "level" => record.level.to_string(),
                "levelno" => record.level.value().to_string(),
                "message" => record.message.clone(),
                "time" => record.time.format(TIME_FORMAT).to_string(),
                "thread" => record.thread.clone(),
                _ => c[0].to_string(),
            })
            .into_owned()
    }
}

impl std::fmt::Debug for Formatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formatter")
            .field("format", &self.format)
            .finish()
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::new(DEFAULT_FORMAT)
    }
}

/// Where a handler writes its records.
///
/// File destinations are opened (in append mode) when the destination is built,
/// so an unwritable location is reported before any record is emitted.
#[derive(Debug)]
pub enum LogDestination {
    /// The standard output
    Stdout,
    /// The standard error
    Stderr,
    /// A sink discarding everything
    Null,
    /// A file, already opened for appending
    File {
        /// the path of the file
        path: PathBuf,
        /// the opened file
        file: File,
    },
}

impl LogDestination {
    /// Reads a destination.
    ///
    /// The keywords `stdout`, `stderr` and `null` are recognized;
    /// anything else is a file path.
    /// In this last case, the missing parent directories are created and the file is opened.
    pub fn open(destination: &str) -> io::Result<Self> {
        match destination {
            "stdout" => Ok(LogDestination::Stdout),
            "stderr" => Ok(LogDestination::Stderr),
            "null" => Ok(LogDestination::Null),
            path => LogDestination::open_file(Path::new(path)),
        }
    }

    fn open_file(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fern::log_file(path)?;
        Ok(LogDestination::File {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Returns the path of the file for file destinations.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LogDestination::File { path, .. } => Some(path),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            LogDestination::Stdout => "stdout".to_string(),
            LogDestination::Stderr => "stderr".to_string(),
            LogDestination::Null => "null".to_string(),
            LogDestination::File { path, .. } => path.display().to_string(),
        }
    }
}

/// A sink receiving the records of the loggers it is attached to.
///
/// Records with a level lower than the handler level are ignored.
pub struct Handler {
    description: String,
    level: LogLevel,
    formatter: Arc<Formatter>,
    colored: bool,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Handler {
    /// Builds a handler writing to the given destination with the given formatter.
    ///
    /// Colors are used for the standard streams when they are terminals.
    pub fn new(destination: LogDestination, formatter: Arc<Formatter>) -> Self {
        let description = destination.describe();
        let (colored, writer): (bool, Box<dyn Write + Send>) = match destination {
            LogDestination::Stdout => (io::stdout().is_terminal(), Box::new(io::stdout())),
            LogDestination::Stderr => (io::stderr().is_terminal(), Box::new(io::stderr())),
            LogDestination::Null => (false, Box::new(io::sink())),
            LogDestination::File { file, .. } => (false, Box::new(file)),
        };
        Handler {
            description,
            level: LogLevel::NotSet,
            formatter,
            colored,
            writer: Mutex::new(writer),
        }
    }

    /// Sets the minimal level of the records this handler writes.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// The minimal level of the records this handler writes.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// A textual description of the destination (`stdout`, `stderr`, `null` or a path).
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Writes a record, if its level is high enough.
    pub fn handle(&self, record: &LogRecord) {
        if record.level < self.level {
            return;
        }
        let line = self.formatter.format(record, self.colored);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            eprintln!("failed to write a log record to {}: {}", self.description, e);
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("description", &self.description)
            .field("level", &self.level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;

    fn record() -> LogRecord {
        LogRecord::new("eyeD3.mp3", LogLevel::Verbose, "Honey's Dead")
    }

    #[test]
    fn test_format_placeholders() {
        let formatter = Formatter::new("<{name}> [{level}/{levelno}]: {message}");
        assert_eq!(
            "<eyeD3.mp3> [VERBOSE/15]: Honey's Dead",
            formatter.format(&record(), false)
        );
    }

    #[test]
    fn test_format_unknown_placeholder() {
        let formatter = Formatter::new("{foo} {message}");
        assert_eq!("{foo} Honey's Dead", formatter.format(&record(), false));
    }

    #[test]
    fn test_format_colored() {
        let formatter = Formatter::new("{level}");
        let line = formatter.format(&record(), true);
        assert!(line.starts_with("\x1B["));
        assert!(line.contains("VERBOSE"));
        assert!(line.ends_with("\x1B[0m"));
    }

    #[test]
    fn test_default_format() {
        let line = Formatter::default().format(&record(), false);
        assert!(line.starts_with("[VERBOSE] "));
        assert!(line.ends_with("<eyeD3.mp3>: Honey's Dead"));
    }

    #[test]
    fn test_keywords() {
        assert!(matches!(
            LogDestination::open("stdout").unwrap(),
            LogDestination::Stdout
        ));
        assert!(matches!(
            LogDestination::open("stderr").unwrap(),
            LogDestination::Stderr
        ));
        assert!(matches!(
            LogDestination::open("null").unwrap(),
            LogDestination::Null
        ));
    }

    #[test]
    fn test_open_file_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("app.log");
        let destination = LogDestination::open(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
        assert_eq!(Some(path.as_path()), destination.path());
    }

    #[test]
    fn test_open_file_in_a_file_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();
        let path = file.join("app.log");
        assert!(LogDestination::open(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_handler_writes_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "first line\n").unwrap();
        let destination = LogDestination::open(path.to_str().unwrap()).unwrap();
        let handler = Handler::new(destination, Arc::new(Formatter::new("{message}")));
        handler.handle(&record());
        assert_eq!(
            "first line\nHoney's Dead\n",
            fs::read_to_string(&path).unwrap()
        );
    }

    #[test]
    fn test_handler_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let destination = LogDestination::open(path.to_str().unwrap()).unwrap();
        let handler = Handler::new(destination, Arc::new(Formatter::new("{message}")))
            .with_level(LogLevel::Info);
        handler.handle(&record());
        handler.handle(&LogRecord::new("eyeD3", LogLevel::Info, "kept"));
        assert_eq!("kept\n", fs::read_to_string(&path).unwrap());
    }

    #[test]
    fn test_null_handler() {
        let handler = Handler::new(LogDestination::Null, Arc::new(Formatter::default()));
        handler.handle(&record());
        assert_eq!("null", handler.description());
    }
}
