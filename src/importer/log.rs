//! Log sink for importer progress lines.
//!
//! Importers talk to an [`ImportLogger`] rather than to `tracing` directly so
//! that tests can capture the exact, prefixed lines with [`MemoryLogger`].

use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;

/// Severity of an importer log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of already prefixed importer log lines.
pub trait ImportLogger {
    fn log(&self, message: &str, severity: Severity);
}

/// Forwards importer lines to `tracing`.
///
/// `tracing` has no notice level: notices are emitted at INFO and every
/// event carries the original severity in its `severity` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ImportLogger for TracingLogger {
    fn log(&self, message: &str, severity: Severity) {
        let severity_name = severity.as_str();
        match severity {
            Severity::Debug => tracing::debug!(severity = severity_name, "{message}"),
            Severity::Info | Severity::Notice => {
                tracing::info!(severity = severity_name, "{message}");
            }
            Severity::Warning => tracing::warn!(severity = severity_name, "{message}"),
            Severity::Error => tracing::error!(severity = severity_name, "{message}"),
        }
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(Severity, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.lock().clone()
    }

    /// Whether a line of `severity` containing `needle` was logged.
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|(logged, line)| *logged == severity && line.contains(needle))
    }
}

impl ImportLogger for MemoryLogger {
    fn log(&self, message: &str, severity: Severity) {
        self.lines.lock().push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_logger_records_lines() {
        let logger = MemoryLogger::new();
        logger.log("[abc] hello", Severity::Notice);
        logger.log("[abc] careful", Severity::Warning);

        assert_eq!(logger.lines().len(), 2);
        assert!(logger.contains(Severity::Notice, "hello"));
        assert!(!logger.contains(Severity::Info, "hello"));
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
        assert!(Severity::Notice > Severity::Info);
    }
}
