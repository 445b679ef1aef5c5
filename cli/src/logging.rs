use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{runtime_dir, LogLevel};

static INIT: OnceLock<()> = OnceLock::new();

pub const LOG_PREFIX: &str = "batlog";
const MAX_LOG_FILES: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// One-shot commands: stderr only.
    Console,
    /// The long-running recorder: stderr plus a daily log file.
    Recorder,
}

pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber. Only the first call has any effect.
pub fn init(level: LogLevel, mode: LogMode, cli_override: Option<LogLevel>) -> LogGuard {
    let mut file_guard = None;

    INIT.get_or_init(|| {
        if let Some(level) = cli_override.unwrap_or(level).as_tracing_level() {
            file_guard = install(level, mode);
        }
    });

    LogGuard { _file: file_guard }
}

fn install(level: Level, mode: LogMode) -> Option<WorkerGuard> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_target(true)
        .with_filter(env_filter(level, &rust_log));

    let (file_layer, guard) = match mode.file_appender() {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter(level, &rust_log));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

/// `level` is the default; `rust_log` directives refine it. SQLite chatter
/// is capped at warn.
fn env_filter(level: Level, rust_log: &str) -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(rust_log);

    match "rusqlite=warn".parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

impl LogMode {
    fn file_appender(self) -> Option<RollingFileAppender> {
        if self == LogMode::Console {
            return None;
        }

        let dir = log_dir();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Warning: cannot create log directory {:?}: {}", dir, e);
            return None;
        }

        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_PREFIX)
            .filename_suffix("log")
            .max_log_files(MAX_LOG_FILES)
            .build(&dir)
            .map_err(|e| eprintln!("Warning: cannot open log file in {:?}: {}", dir, e))
            .ok()
    }
}

pub fn log_dir() -> PathBuf {
    runtime_dir()
}
