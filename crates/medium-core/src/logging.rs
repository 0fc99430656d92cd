//! Process-wide logging built on `tracing`.
//!
//! `init` installs one fmt subscriber for the whole process. `get_logger` hands
//! out per-component handles from a registry keyed by name, so asking for the
//! same component twice never attaches a second output.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

use crate::error::Error;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static SUBSCRIBER: OnceCell<()> = OnceCell::new();

static REGISTRY: Lazy<Mutex<HashMap<String, Logger>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Minimum severity a logger lets through. Ordered from least to most verbose.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    #[default]
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(Error::Config(format!("unknown log level '{other}'"))),
        }
    }
}

/// Install the console subscriber once per process.
///
/// `RUST_LOG`, when set, takes precedence over `level`. If another global
/// subscriber is already installed (an embedding application, a test harness)
/// it is left in place.
pub fn init(level: LogLevel) {
    SUBSCRIBER.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

/// Fetch the logger for `name`, creating it on first use.
///
/// Later calls return a handle to the same registry entry and update its
/// minimum level.
pub fn get_logger(name: &str, level: LogLevel) -> Logger {
    let mut registry = REGISTRY.lock().unwrap_or_else(|p| p.into_inner());
    let logger = registry
        .entry(name.to_string())
        .or_insert_with(|| Logger::new(name, level))
        .clone();
    logger.set_level(level);
    logger
}

#[derive(Debug)]
struct LoggerInner {
    name: String,
    level: AtomicU8,
}

/// Named, leveled logging handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    fn new(name: &str, level: LogLevel) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                name: name.to_string(),
                level: AtomicU8::new(level as u8),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.inner.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: LogLevel) {
        self.inner.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level()
    }

    /// True when both handles point at the same registry entry.
    pub fn same_entry(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn log(&self, level: LogLevel, msg: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }
        let span = tracing::error_span!("component", name = %self.inner.name);
        let _entered = span.enter();
        match level {
            LogLevel::Error => tracing::error!("{}", msg),
            LogLevel::Warn => tracing::warn!("{}", msg),
            LogLevel::Info => tracing::info!("{}", msg),
            LogLevel::Debug => tracing::debug!("{}", msg),
            LogLevel::Trace => tracing::trace!("{}", msg),
        }
    }

    pub fn error(&self, msg: impl fmt::Display) {
        self.log(LogLevel::Error, msg)
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        self.log(LogLevel::Warn, msg)
    }

    pub fn info(&self, msg: impl fmt::Display) {
        self.log(LogLevel::Info, msg)
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        self.log(LogLevel::Debug, msg)
    }

    pub fn trace(&self, msg: impl fmt::Display) {
        self.log(LogLevel::Trace, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_yields_same_entry() {
        let a = get_logger("logging-tests-same", LogLevel::Info);
        let b = get_logger("logging-tests-same", LogLevel::Info);
        let c = get_logger("logging-tests-other", LogLevel::Info);
        assert!(a.same_entry(&b));
        assert!(!a.same_entry(&c));
    }

    #[test]
    fn last_requested_level_wins() {
        let a = get_logger("logging-tests-level", LogLevel::Info);
        assert!(a.enabled(LogLevel::Info));
        assert!(!a.enabled(LogLevel::Debug));

        let b = get_logger("logging-tests-level", LogLevel::Error);
        assert_eq!(a.level(), LogLevel::Error);
        assert!(!b.enabled(LogLevel::Warn));
        assert!(b.enabled(LogLevel::Error));
    }

    #[test]
    fn level_parsing_and_ordering() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Error < LogLevel::Info);
        assert!(LogLevel::Trace > LogLevel::Debug);
    }

    #[test]
    fn init_is_idempotent() {
        init(LogLevel::Info);
        init(LogLevel::Debug);
        get_logger("logging-tests-init", LogLevel::Info).info("still one subscriber");
    }
}
