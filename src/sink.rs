//! Destinations for formatted log lines.
//!
//! [`LogSink`] is the seam between the middleware and whatever records
//! the line. [`TracingSink`] emits `tracing` events and is the default;
//! [`MemorySink`] keeps every entry in memory so callers can inspect what
//! was logged.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::Level;

/// Structured data logged alongside the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogContext {
    /// Wall time spent in the downstream handler, rounded. Absent when the
    /// handler failed.
    pub milliseconds: Option<u64>,
}

pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, message: &str, context: &LogContext);
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn log(&self, level: Level, message: &str, context: &LogContext) {
        (**self).log(level, message, context);
    }
}

/// Emits each line as a `tracing` event at the resolved level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str, context: &LogContext) {
        let milliseconds = context.milliseconds;
        match level {
            Level::ERROR => tracing::error!(milliseconds, "{message}"),
            Level::WARN => tracing::warn!(milliseconds, "{message}"),
            Level::INFO => tracing::info!(milliseconds, "{message}"),
            Level::DEBUG => tracing::debug!(milliseconds, "{message}"),
            _ => tracing::trace!(milliseconds, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub context: LogContext,
}

/// Keeps every logged entry in memory, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.level == level)
            .count()
    }

    #[must_use]
    pub fn has_records(&self, level: Level) -> bool {
        self.count(level) > 0
    }

    #[must_use]
    pub fn has_record_containing(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, message: &str, context: &LogContext) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogRecord {
                level,
                message: message.to_string(),
                context: *context,
            });
    }
}
