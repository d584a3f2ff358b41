/*!
 * Colored stderr logger for applications embedding the engine.
 *
 * The library itself only logs through the `log` facade; call [`init`] once
 * at startup to get timestamped, colored output on stderr.
 */

use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::app_config::LogLevel;

// @struct: Stderr logger with per-level colors
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @returns: ANSI color and label for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Map a configured level to the `log` filter
pub fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Install the logger as the global `log` backend
///
/// Fails if another logger was installed first.
pub fn init(level: &LogLevel) -> Result<(), SetLoggerError> {
    let filter = level_filter(level);
    log::set_boxed_logger(Box::new(CustomLogger::new(filter)))?;
    log::set_max_level(filter);
    Ok(())
}

/// Change the verbosity of an installed logger
pub fn set_level(level: &LogLevel) {
    log::set_max_level(level_filter(level));
}
