//! Structured logging for gravity-pulse
//!
//! Tag + level console logger with:
//! - Standard levels (Error/Warning/Info/Debug)
//! - Minimum-level filtering configured once at startup
//! - Colored console output
//!
//! ## Usage
//!
//! ```ignore
//! use gravity_pulse::logger::{self, LogTag};
//!
//! logger::error(LogTag::Api, "Connection failed");
//! logger::info(LogTag::Ledger, "Position opened");
//! logger::debug(LogTag::Collector, "Raw market payload: ..."); // only with --debug
//! ```

mod format;
mod levels;
mod tags;

pub use levels::LogLevel;
pub use tags::LogTag;

use once_cell::sync::Lazy;
use std::sync::RwLock;

static MIN_LEVEL: Lazy<RwLock<LogLevel>> = Lazy::new(|| RwLock::new(LogLevel::Info));

/// Initialize the logger system. Call once at startup, before any logging.
///
/// `debug` widens output to include per-module diagnostics; `quiet` narrows
/// it to warnings and errors. `debug` wins when both are set.
pub fn init(debug: bool, quiet: bool) {
    let level = if debug {
        LogLevel::Debug
    } else if quiet {
        LogLevel::Warning
    } else {
        LogLevel::Info
    };
    if let Ok(mut min) = MIN_LEVEL.write() {
        *min = level;
    }
}

fn should_log(level: LogLevel) -> bool {
    // Errors always log
    if level == LogLevel::Error {
        return true;
    }
    match MIN_LEVEL.read() {
        Ok(min) => level <= *min,
        Err(_) => true,
    }
}

fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(level) {
        return;
    }
    format::format_and_log(tag, level, message);
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues)
pub fn warning(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics, gated by --debug)
pub fn debug(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Debug, message);
}
