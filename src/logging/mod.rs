//! Application logging system
//!
//! Colored console logging to stderr, plus an optional per-session log file
//! in the application's cache directory. File output only starts once
//! [`init`] is called, so library users and tests log to the console only.

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::config;
use crate::utils::get_cache_dir;

/// Number of session log files kept on disk
const KEEP_LOG_FILES: usize = 10;

/// Log levels for categorizing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Logger configuration
pub struct LoggerConfig {
    /// Minimum log level to output
    pub min_level: LogLevel,
    /// Whether to output to stderr
    pub console_output: bool,
    /// Whether to output to file
    pub file_output: bool,
    /// Whether to use colors in console output
    pub use_colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            console_output: true,
            file_output: false,
            use_colors: true,
        }
    }
}

struct Logger {
    config: LoggerConfig,
    log_file: Option<File>,
    log_path: Option<PathBuf>,
}

impl Logger {
    fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            log_file: None,
            log_path: None,
        }
    }

    fn open_log_file(&mut self) {
        let log_dir = get_log_dir();

        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create log directory: {}", e);
            return;
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("{}_{}.log", config::app::NAME, timestamp));

        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => {
                self.log_file = Some(file);
                self.log_path = Some(log_path);
                self.config.file_output = true;
            }
            Err(e) => eprintln!("Failed to create log file: {}", e),
        }
    }

    fn log(&mut self, level: LogLevel, module: &str, message: &str) {
        if level < self.config.min_level {
            return;
        }

        let timestamp = Local::now();

        if self.config.console_output {
            let line = if self.config.use_colors {
                format_message_colored(level, module, message, &timestamp)
            } else {
                format_message_plain(level, module, message, &timestamp)
            };
            eprintln!("{}", line);
        }

        if self.config.file_output {
            if let Some(ref mut file) = self.log_file {
                let _ = writeln!(
                    file,
                    "{}",
                    format_message_plain(level, module, message, &timestamp)
                );
                let _ = file.flush();
            }
        }
    }
}

fn format_message_colored(
    level: LogLevel,
    module: &str,
    message: &str,
    timestamp: &DateTime<Local>,
) -> String {
    let reset = "\x1b[0m";
    let dim = "\x1b[90m";

    let level_color = match level {
        LogLevel::Debug => "\x1b[35m",
        LogLevel::Info => "\x1b[32m",
        LogLevel::Warn => "\x1b[33m",
        LogLevel::Error => "\x1b[31m",
    };

    format!(
        "{}{} {}●{} {}{}:{} {}",
        dim,
        timestamp.format("%H:%M:%S"),
        level_color,
        reset,
        level_color,
        module,
        reset,
        message
    )
}

fn format_message_plain(
    level: LogLevel,
    module: &str,
    message: &str,
    timestamp: &DateTime<Local>,
) -> String {
    format!(
        "[{}] [{}] [{}] {}",
        timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        level.as_str(),
        module,
        message
    )
}

static LOGGER: Lazy<Mutex<Logger>> = Lazy::new(|| Mutex::new(Logger::new()));

/// Get the log directory path
pub fn get_log_dir() -> PathBuf {
    get_cache_dir(config::app::NAME).join("logs")
}

/// Get the current log file path (if any)
pub fn get_current_log_path() -> Option<PathBuf> {
    LOGGER.lock().ok()?.log_path.clone()
}

/// Switch between DEBUG and INFO minimum levels
pub fn set_log_level(debug: bool) {
    if let Ok(mut logger) = LOGGER.lock() {
        logger.config.min_level = if debug {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };
    }
}

/// Log a debug message
pub fn debug(module: &str, message: &str) {
    if let Ok(mut logger) = LOGGER.lock() {
        logger.log(LogLevel::Debug, module, message);
    }
}

/// Log an info message
pub fn info(module: &str, message: &str) {
    if let Ok(mut logger) = LOGGER.lock() {
        logger.log(LogLevel::Info, module, message);
    }
}

/// Log a warning message
pub fn warn(module: &str, message: &str) {
    if let Ok(mut logger) = LOGGER.lock() {
        logger.log(LogLevel::Warn, module, message);
    }
}

/// Log an error message
pub fn error(module: &str, message: &str) {
    if let Ok(mut logger) = LOGGER.lock() {
        logger.log(LogLevel::Error, module, message);
    }
}

/// Log a message with format arguments (debug level)
#[macro_export]
macro_rules! log_debug {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::debug($module, &format!($($arg)*))
    };
}

/// Log a message with format arguments (info level)
#[macro_export]
macro_rules! log_info {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::info($module, &format!($($arg)*))
    };
}

/// Log a message with format arguments (warn level)
#[macro_export]
macro_rules! log_warn {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::warn($module, &format!($($arg)*))
    };
}

/// Log a message with format arguments (error level)
#[macro_export]
macro_rules! log_error {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::error($module, &format!($($arg)*))
    };
}

/// Clean up old log files, keeping only the most recent ones
pub fn cleanup_old_logs(keep_count: usize) -> Result<usize, String> {
    let log_dir = get_log_dir();

    if !log_dir.exists() {
        return Ok(0);
    }

    let mut log_files: Vec<_> = fs::read_dir(&log_dir)
        .map_err(|e| format!("Failed to read log directory: {}", e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "log"))
        .collect();

    // Newest first
    log_files.sort_by(|a, b| {
        let a_time = a.metadata().and_then(|m| m.modified()).ok();
        let b_time = b.metadata().and_then(|m| m.modified()).ok();
        b_time.cmp(&a_time)
    });

    let mut deleted = 0;
    for entry in log_files.into_iter().skip(keep_count) {
        if fs::remove_file(entry.path()).is_ok() {
            deleted += 1;
        }
    }

    Ok(deleted)
}

/// Initialize the logger (call at application startup)
///
/// With `file_output` set, a session log file is opened and old ones are rotated.
pub fn init(file_output: bool) {
    if file_output {
        if let Ok(mut logger) = LOGGER.lock() {
            logger.open_log_file();
        }
    }

    info("logger", "Pokedex logging initialized");

    if let Some(path) = get_current_log_path() {
        info("logger", &format!("Log file: {}", path.display()));

        match cleanup_old_logs(KEEP_LOG_FILES) {
            Ok(deleted) if deleted > 0 => {
                info("logger", &format!("Cleaned up {} old log files", deleted));
            }
            Err(e) => {
                warn("logger", &format!("Failed to cleanup old logs: {}", e));
            }
            _ => {}
        }
    }
}
