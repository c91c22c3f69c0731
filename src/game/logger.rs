//! Public transparency log
//!
//! Every state-changing event is appended here. The buffer is append-only and
//! is the game's audit trail; verbosity and output mode only control what is
//! echoed to stdout as it happens.

use crate::game::VerbosityLevel;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::ops::Deref;

/// Output format for echoed log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Machine-readable JSON output (one object per line)
    Json,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Echo to stdout as well as recording (default)
    #[default]
    Stdout,
    /// Record only
    Memory,
}

/// What a log entry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    Setup,
    Phase,
    Table,
    ChipMove,
    Reward,
    Event,
    Decision,
    Confirm,
    Cleanup,
}

/// One public log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub category: LogCategory,
    pub message: String,
}

/// Guard type that provides read-only access to log entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Centralized logger for public game events
///
/// Logging takes `&self` so that controllers, which only see a read-only view
/// of the game, can record their choices.
#[derive(Debug, Clone, Default)]
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_format: OutputFormat,
    output_mode: OutputMode,
    log_buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logger with specified verbosity
    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            ..Self::default()
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    /// Get access to recorded log entries
    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    /// All recorded messages, in order
    pub fn messages(&self) -> Vec<String> {
        self.log_buffer
            .borrow()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }

    /// Serialize the whole log as JSON lines
    pub fn to_json_lines(&self) -> crate::Result<String> {
        let mut out = String::new();
        for entry in self.log_buffer.borrow().iter() {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Record an entry and echo it if verbosity allows
    pub fn log(&self, level: VerbosityLevel, category: LogCategory, message: &str) {
        let entry = LogEntry {
            level,
            category,
            message: message.to_string(),
        };

        if self.output_mode == OutputMode::Stdout && level <= self.verbosity {
            self.echo(&entry);
        }

        self.log_buffer.borrow_mut().push(entry);
    }

    fn echo(&self, entry: &LogEntry) {
        match self.output_format {
            OutputFormat::Text => {
                if entry.level == VerbosityLevel::Minimal {
                    println!("{}", entry.message);
                } else {
                    println!("  {}", entry.message);
                }
            }
            OutputFormat::Json => {
                if let Ok(line) = serde_json::to_string(entry) {
                    println!("{line}");
                }
            }
        }
    }

    #[inline]
    pub fn minimal(&self, category: LogCategory, message: &str) {
        self.log(VerbosityLevel::Minimal, category, message);
    }

    #[inline]
    pub fn normal(&self, category: LogCategory, message: &str) {
        self.log(VerbosityLevel::Normal, category, message);
    }

    #[inline]
    pub fn verbose(&self, category: LogCategory, message: &str) {
        self.log(VerbosityLevel::Verbose, category, message);
    }

    /// Log a controller decision
    ///
    /// The controller name is kept out of the recorded message so logs match
    /// regardless of which controller made the choice.
    #[inline]
    pub fn controller_choice(&self, player: crate::core::PlayerId, message: &str) {
        self.normal(LogCategory::Decision, &format!("Player {player} {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    fn quiet_logger() -> GameLogger {
        let mut logger = GameLogger::new();
        logger.set_output_mode(OutputMode::Memory);
        logger
    }

    #[test]
    fn test_logger_creation() {
        let logger = GameLogger::new();
        assert_eq!(logger.verbosity(), VerbosityLevel::Normal);
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_everything_is_recorded_regardless_of_verbosity() {
        let mut logger = quiet_logger();
        logger.set_verbosity(VerbosityLevel::Silent);

        logger.normal(LogCategory::Phase, "phase message");
        logger.verbose(LogCategory::ChipMove, "chip message");

        let logs = logger.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "phase message");
        assert_eq!(logs[1].category, LogCategory::ChipMove);
    }

    #[test]
    fn test_controller_choice_format() {
        let logger = quiet_logger();
        logger.controller_choice(PlayerId::new(1), "chose to stop drawing");
        assert_eq!(logger.messages(), vec!["Player 1 chose to stop drawing"]);
        assert_eq!(logger.logs()[0].category, LogCategory::Decision);
    }

    #[test]
    fn test_json_lines() {
        let logger = quiet_logger();
        logger.minimal(LogCategory::Setup, "GAME START");
        let json = logger.to_json_lines().unwrap();
        assert_eq!(
            json,
            "{\"level\":\"Minimal\",\"category\":\"setup\",\"message\":\"GAME START\"}\n"
        );
    }
}
