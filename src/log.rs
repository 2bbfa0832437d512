//! Leveled file logging for the dependency core.
//!
//! What each level carries here:
//! - ERROR: a validated edge that the repository refused to persist
//! - WARN: cycles in stored edges, dependencies that could not be fetched
//! - INFO: edges added or removed, tasks held back by a failed dependency
//! - DEBUG: validation verdicts, graph sizes, config and snapshot loads
//! - TRACE: per-node traversal detail
//!
//! Nothing is written until a sink is installed with [`init`] (the default
//! `~/.taskdeps/taskdeps.log`) or [`init_at`] (any path). Until then every
//! macro costs one atomic load. `TASKDEPS_DEBUG=1` raises the level to DEBUG.

use std::fmt;
use std::fs::{self, File};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;

use crate::config::Config;
use crate::Result;

const LOG_FILE: &str = "taskdeps.log";
const DEBUG_ENV: &str = "TASKDEPS_DEBUG";
const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static SINK: Mutex<Option<LineWriter<File>>> = parking_lot::const_mutex(None);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
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

/// Log to `~/.taskdeps/taskdeps.log`, returning the path in use.
pub fn init(debug: bool) -> Result<PathBuf> {
    let path = Config::app_dir()?.join(LOG_FILE);
    init_at(&path, debug)?;
    Ok(path)
}

/// Log to `path`, truncating it. Replaces any sink installed earlier.
///
/// The level is DEBUG when `debug` is set or `TASKDEPS_DEBUG` is `1`/`true`,
/// INFO otherwise.
pub fn init_at(path: &Path, debug: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    *SINK.lock() = Some(LineWriter::new(file));

    let level = if debug || debug_from_env() {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    set_level(level);
    Ok(())
}

fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn set_level(level: LogLevel) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn level() -> LogLevel {
    LogLevel::from_u8(LEVEL.load(Ordering::Relaxed))
}

pub fn enabled(level: LogLevel) -> bool {
    level <= self::level()
}

/// Write one line through the installed sink. Used by the `tlog*` macros.
#[doc(hidden)]
pub fn write(level: LogLevel, args: fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }
    let mut sink = SINK.lock();
    if let Some(writer) = sink.as_mut() {
        let now = chrono::Local::now().time();
        // A failed write is dropped; logging never fails a resolver call.
        let _ = writeln!(writer, "{}", format_line(level, &now, args));
    }
}

fn format_line(level: LogLevel, time: &chrono::NaiveTime, args: fmt::Arguments<'_>) -> String {
    format!(
        "[{}] [{}] {}",
        time.format(TIMESTAMP_FORMAT),
        level.as_str(),
        args
    )
}

#[macro_export]
macro_rules! tlog {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! tlog_error {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Error, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! tlog_warn {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! tlog_debug {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Debug, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! tlog_trace {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Trace, format_args!($($arg)*))
    };
}
