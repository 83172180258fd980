//! Logging bootstrap for the tile cutter.
//!
//! Installs a `tracing` registry with an env-driven filter, a stderr sink, and an optional
//! rolling file sink. `init` is meant to run once at startup; later calls return the handle
//! installed by the first one and ignore their arguments.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_log::AsLog;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, util::SubscriberInitExt};

const ENV_FILTER_VARS: [&str; 2] = ["TILE_CUTTER_LOG", "RUST_LOG"];

static LOG_HANDLE: OnceLock<LogHandle> = OnceLock::new();

pub use tracing_subscriber::filter::LevelFilter as LogLevel;

/// How often the file sink starts a new file.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LogRolling {
    Hourly,
    Daily,
    Never,
}

impl LogRolling {
    fn rotation(self) -> tracing_appender::rolling::Rotation {
        match self {
            LogRolling::Hourly => tracing_appender::rolling::Rotation::HOURLY,
            LogRolling::Daily => tracing_appender::rolling::Rotation::DAILY,
            LogRolling::Never => tracing_appender::rolling::Rotation::NEVER,
        }
    }
}

/// File sink settings.
#[derive(Debug, Clone)]
pub struct FileSink {
    pub directory: PathBuf,
    /// File name prefix; the suffix is `.log`.
    pub file_prefix: String,
    /// Rolled files to keep. `None` keeps everything.
    pub retention: Option<usize>,
    pub level: LevelFilter,
    pub rolling: LogRolling,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            file_prefix: "tile-cutter".to_string(),
            retention: Some(7),
            level: LevelFilter::DEBUG,
            rolling: LogRolling::Daily,
        }
    }

    pub fn in_default_directory() -> Self {
        Self::new(default_log_directory())
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    /// `None` logs to stderr only.
    pub file: Option<FileSink>,
    /// Forward `log` crate records into `tracing`.
    pub capture_log: bool,
    /// Filter directive such as `cutter_core=debug`; falls back to the environment.
    pub env_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::WARN,
            file: None,
            capture_log: true,
            env_filter: env_directive(),
        }
    }
}

impl LogConfig {
    pub fn with_console_level(mut self, level: LevelFilter) -> Self {
        self.console_level = level;
        self
    }

    pub fn with_file(mut self, sink: FileSink) -> Self {
        self.file = Some(sink);
        self
    }
}

/// Keeps the background file writer alive.
#[derive(Debug)]
pub struct LogHandle {
    _guard: Option<WorkerGuard>,
    directory: Option<PathBuf>,
}

impl LogHandle {
    /// Directory of the file sink, if one was installed.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}

/// Install the global subscriber, or return the one already installed.
pub fn init(config: LogConfig) -> Result<&'static LogHandle> {
    if let Some(handle) = LOG_HANDLE.get() {
        return Ok(handle);
    }

    let handle = setup(config)?;
    Ok(LOG_HANDLE.get_or_init(|| handle))
}

fn setup(config: LogConfig) -> Result<LogHandle> {
    let file_level = config.file.as_ref().map(|sink| sink.level).unwrap_or(LevelFilter::OFF);
    if config.capture_log {
        install_log_tracer(file_level.max(config.console_level));
    }

    let directive = config
        .env_filter
        .or_else(env_directive)
        .unwrap_or_else(|| "info".to_string());
    let env_filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("parsing log filter directive {directive:?}"))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(config.console_level);

    let (file_layer, guard, directory) = match config.file {
        Some(sink) => {
            let (writer, guard) = file_writer(&sink)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_file(true)
                .with_line_number(true)
                .with_filter(sink.level);
            (Some(layer), Some(guard), Some(sink.directory))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    Ok(LogHandle { _guard: guard, directory })
}

fn file_writer(sink: &FileSink) -> Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&sink.directory)
        .with_context(|| format!("creating log directory at {}", sink.directory.display()))?;

    if let Some(retention) = sink.retention.filter(|keep| *keep > 0) {
        prune_old_logs(&sink.directory, &sink.file_prefix, retention)
            .context("applying log retention policy")?;
    }

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(sink.rolling.rotation())
        .filename_prefix(&sink.file_prefix)
        .filename_suffix("log")
        .build(&sink.directory)
        .context("creating rolling log appender")?;

    Ok(tracing_appender::non_blocking(appender))
}

fn env_directive() -> Option<String> {
    ENV_FILTER_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .filter(|directive| !directive.trim().is_empty())
}

fn install_log_tracer(max_level: LevelFilter) {
    // Another logger may already own the `log` facade; tracing still works without it.
    let _ = tracing_log::LogTracer::builder().with_max_level(max_level.as_log()).init();
}

/// Delete the oldest `<prefix>*` files in `dir` until `keep` remain.
fn prune_old_logs(dir: &Path, prefix: &str, keep: usize) -> Result<()> {
    let listing =
        fs::read_dir(dir).with_context(|| format!("reading log directory at {}", dir.display()))?;

    let mut rolled = Vec::new();
    for entry in listing.flatten() {
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let path = entry.path();
        if meta.is_file() && matches_prefix(&path, prefix) {
            rolled.push((meta.modified().unwrap_or(SystemTime::UNIX_EPOCH), path));
        }
    }

    rolled.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in rolled.into_iter().skip(keep) {
        let _ = fs::remove_file(path);
    }
    Ok(())
}

fn matches_prefix(path: &Path, prefix: &str) -> bool {
    path.file_stem().and_then(OsStr::to_str).is_some_and(|stem| stem.starts_with(prefix))
}

fn default_log_directory() -> PathBuf {
    directories::ProjectDirs::from("com", "TileCutter", "tile-cutter")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("tile-cutter").join("logs"))
}
