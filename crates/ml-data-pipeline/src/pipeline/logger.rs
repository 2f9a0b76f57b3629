//! Logging capability injected into the pipeline.
//!
//! The orchestrator never logs through global state; it calls the
//! [`PipelineLogger`] it was built with. [`TracingLogger`] forwards to
//! `tracing` and is the default. [`MemoryLogger`] keeps every record in
//! memory, which is what tests assert against.
//!
//! # Example
//!
//! ```rust,ignore
//! use ml_data_pipeline::{InferencePipeline, LogLevel};
//!
//! let pipeline = InferencePipeline::builder()
//!     .loader(loader)
//!     .transformer(transformer)
//!     .model(model)
//!     .on_log(|level, message| {
//!         if level >= LogLevel::Info {
//!             eprintln!("[{level}] {message}");
//!         }
//!     })
//!     .build()?;
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a pipeline log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Trait for receiving log events from the pipeline.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to another thread.
pub trait PipelineLogger: Send + Sync {
    /// Record one event.
    fn log(&self, level: LogLevel, message: &str);

    /// Whether events at `level` are recorded at all.
    ///
    /// The pipeline skips rendering data previews when this returns false.
    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }
}

/// Forwards events to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl PipelineLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!("{}", message),
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Trace => tracing::enabled!(tracing::Level::TRACE),
            LogLevel::Debug => tracing::enabled!(tracing::Level::DEBUG),
            LogLevel::Info => tracing::enabled!(tracing::Level::INFO),
            LogLevel::Warn => tracing::enabled!(tracing::Level::WARN),
            LogLevel::Error => tracing::enabled!(tracing::Level::ERROR),
        }
    }
}

/// Wrapper that implements [`PipelineLogger`] using a closure.
pub struct ClosureLogger<F>
where
    F: Fn(LogLevel, &str) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureLogger<F>
where
    F: Fn(LogLevel, &str) + Send + Sync,
{
    /// Creates a new closure-based logger.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> PipelineLogger for ClosureLogger<F>
where
    F: Fn(LogLevel, &str) + Send + Sync,
{
    fn log(&self, level: LogLevel, message: &str) {
        (self.callback)(level, message);
    }
}

/// A recorded log event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages logged at exactly `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.level == level)
            .map(|record| record.message.clone())
            .collect()
    }

    /// Number of records logged at exactly `level`.
    pub fn count(&self, level: LogLevel) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|record| record.level == level)
            .count()
    }

    /// Drop all records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl PipelineLogger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

static_assertions::assert_impl_all!(TracingLogger: Send, Sync);
static_assertions::assert_impl_all!(MemoryLogger: Send, Sync);
