//! Lightweight structured logging.
//!
//! The engine logs in exactly one place (the dispatch fault boundary), so
//! it carries its own tiny sink abstraction instead of a logging framework.
//! Embedders install a [`LogSink`] to forward entries wherever they like;
//! the default writes to stderr.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Verbose diagnostics.
    Debug,
    /// Routine events.
    Info,
    /// Something recoverable went wrong.
    Warn,
    /// A fault was caught.
    Error,
}

impl LogLevel {
    /// Uppercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log record.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity.
    pub level: LogLevel,
    /// Module-ish origin, e.g. `"waypoint::dispatch"`.
    pub target: &'static str,
    /// The message.
    pub message: String,
    /// When the entry was produced.
    pub timestamp: SystemTime,
}

/// Destination for log entries.
pub trait LogSink: Send + Sync {
    /// Consume one entry.
    fn log(&self, entry: &LogEntry);
}

/// Default sink: one line per entry on stderr.
#[derive(Debug, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn log(&self, entry: &LogEntry) {
        eprintln!("[{}] {}: {}", entry.level, entry.target, entry.message);
    }
}

/// Sink that buffers entries in memory; intended for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured entries.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl LogSink for MemorySink {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }
}

struct GlobalLogger {
    sink: Arc<dyn LogSink>,
    min_level: LogLevel,
}

static LOGGER: RwLock<Option<GlobalLogger>> = RwLock::new(None);

/// Install a sink, replacing any previous one.
pub fn set_sink(sink: Arc<dyn LogSink>) {
    let min_level = LOGGER
        .read()
        .as_ref()
        .map_or(LogLevel::Info, |logger| logger.min_level);
    *LOGGER.write() = Some(GlobalLogger { sink, min_level });
}

/// Set the minimum level that reaches the sink. Defaults to `Info`.
pub fn set_level(level: LogLevel) {
    let mut guard = LOGGER.write();
    match guard.as_mut() {
        Some(logger) => logger.min_level = level,
        None => {
            *guard = Some(GlobalLogger {
                sink: Arc::new(StderrSink),
                min_level: level,
            });
        }
    }
}

/// Emit an entry.
pub fn log(level: LogLevel, target: &'static str, message: impl Into<String>) {
    let guard = LOGGER.read();
    let (sink, min_level) = match guard.as_ref() {
        Some(logger) => (Arc::clone(&logger.sink), logger.min_level),
        // Uninstalled logger: stderr at the default level.
        None => (Arc::new(StderrSink) as Arc<dyn LogSink>, LogLevel::Info),
    };
    drop(guard);

    if level < min_level {
        return;
    }
    sink.log(&LogEntry {
        level,
        target,
        message: message.into(),
        timestamp: SystemTime::now(),
    });
}

/// Emit at `Error`.
pub fn error(target: &'static str, message: impl Into<String>) {
    log(LogLevel::Error, target, message);
}

/// Emit at `Warn`.
pub fn warn(target: &'static str, message: impl Into<String>) {
    log(LogLevel::Warn, target, message);
}

/// Emit at `Info`.
pub fn info(target: &'static str, message: impl Into<String>) {
    log(LogLevel::Info, target, message);
}
