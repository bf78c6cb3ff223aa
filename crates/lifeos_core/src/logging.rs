//! Core logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Start one rolling file logger per process.
//! - Capture panics as single-line metadata events.
//!
//! # Invariants
//! - A second init with the same level and directory is a no-op.
//! - A second init with a different level or directory is rejected.
//! - Initialization never panics.
//! - Health values, protocol names and journal text never reach log lines.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "lifeos";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Severity filter accepted by [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Case-insensitive; `warning` is accepted for `warn`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unsupported log level `{other}`; expected trace|debug|info|warn|error"
            )),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: LogLevel,
    dir: PathBuf,
}

impl LogTarget {
    fn parse(level: &str, dir: &str) -> Result<Self, String> {
        let level = LogLevel::parse(level)?;
        let dir = dir.trim();
        if dir.is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        if !Path::new(dir).is_absolute() {
            return Err(format!("log_dir must be an absolute path, got `{dir}`"));
        }
        Ok(Self {
            level,
            dir: PathBuf::from(dir),
        })
    }

    fn ensure_matches(&self, requested: &LogTarget) -> Result<(), String> {
        if self.dir != requested.dir {
            return Err(format!(
                "logging already writes to `{}`; refusing to switch to `{}`",
                self.dir.display(),
                requested.dir.display()
            ));
        }
        if self.level != requested.level {
            return Err(format!(
                "logging already runs at `{}`; refusing to switch to `{}`",
                self.level, requested.level
            ));
        }
        Ok(())
    }
}

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error`.
/// - `log_dir` is empty, relative, or cannot be created.
/// - Logging is already active with another level or directory.
/// - The flexi_logger backend fails to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LogTarget::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(requested.clone()))?;
    active.target.ensure_matches(&requested)
}

/// Returns `(level, log_dir)` of active logging, or `None` before init.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.target.level.as_str(), active.target.dir.clone()))
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        LogLevel::Debug.as_str()
    } else {
        LogLevel::Info.as_str()
    }
}

fn start(target: LogTarget) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&target.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            target.dir.display()
        )
    })?;

    let handle = Logger::try_with_str(target.level.as_str())
        .map_err(|err| format!("invalid log level `{}`: {err}", target.level))?
        .log_to_file(
            FileSpec::default()
                .directory(target.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    hook_panics();

    let build = if cfg!(debug_assertions) { "debug" } else { "release" };
    info!(
        "event=core_init module=core status=ok platform={} build={build} version={} level={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        target.level
    );

    Ok(ActiveLogger {
        target,
        _handle: handle,
    })
}

fn hook_panics() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            one_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        chained(info);
    }));
}

/// Flattens line breaks and caps `value` at `limit` characters.
fn one_line(value: &str, limit: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut capped: String = flat.chars().take(limit).collect();
    capped.push_str("...");
    capped
}

#[cfg(test)]
mod tests {
    use super::{default_log_level, init_logging, logging_status, one_line, LogLevel, LogTarget};

    #[test]
    fn log_level_parse_accepts_aliases_and_case() {
        assert_eq!(LogLevel::parse(" Warning "), Ok(LogLevel::Warn));
        assert_eq!(LogLevel::parse("TRACE"), Ok(LogLevel::Trace));
        assert!(LogLevel::parse("verbose").is_err());
        assert!(LogLevel::parse(default_log_level()).is_ok());
    }

    #[test]
    fn log_target_requires_absolute_dir() {
        assert!(LogTarget::parse("info", "   ").is_err());
        let err = LogTarget::parse("info", "logs/dev").unwrap_err();
        assert!(err.contains("absolute"));
    }

    #[test]
    fn one_line_flattens_readings_and_caps_length() {
        let flattened = one_line("glucose=104\nhrv=38\rstatus", 10);
        assert_eq!(flattened, "glucose=10...");
        assert_eq!(one_line("short", 10), "short");
    }

    #[test]
    fn reinit_keeps_first_target() {
        let root = tempfile::tempdir().expect("temp dir");
        let logs = root.path().join("logs");
        let logs_str = logs.to_str().expect("utf-8 temp dir");
        let elsewhere = root.path().join("elsewhere");

        init_logging("info", logs_str).expect("first init");
        init_logging("INFO", logs_str).expect("same target is a no-op");

        let err = init_logging("debug", logs_str).unwrap_err();
        assert!(err.contains("refusing to switch to `debug`"));
        let err = init_logging("info", elsewhere.to_str().expect("utf-8 temp dir")).unwrap_err();
        assert!(err.contains("refusing to switch"));

        assert_eq!(logging_status(), Some(("info", logs)));
    }
}
