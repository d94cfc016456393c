//! Logging configuration for RecordQuery
//!
//! Structured logging through `tracing`, with stdout and daily-rotated
//! file outputs. Dispatch, cache and engine stages emit `debug`/`trace`
//! events; rejected descriptors emit `warn`.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Default log file name when the configured path has none
const DEFAULT_LOG_FILE: &str = "recordquery.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output destination
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to a file with daily rotation
    File(PathBuf),
    /// Output to both stdout and file
    Both(PathBuf),
}

/// Log format style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line format (default)
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `recordquery=debug`
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Info level, stdout
    pub fn info() -> Self {
        Self::default()
    }

    /// Debug level: shows dispatch, cache and engine stages
    pub fn debug() -> Self {
        Self {
            level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Trace level: also shows groups removed by HAVING
    pub fn trace() -> Self {
        Self {
            level: "trace".to_string(),
            ..Default::default()
        }
    }

    /// Warn level: only rejected descriptors and failures
    pub fn warn() -> Self {
        Self {
            level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// Log to a daily-rotated file
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Log to stdout and a daily-rotated file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the filter directive
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Filter from `RUST_LOG`, falling back to the configured level, then to `info`
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    fn layer<W>(&self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
        match self.format {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        }
    }

    /// Install the global subscriber.
    ///
    /// Returns the file writer guard when logging to a file; keep it alive
    /// for as long as logs should be written. If a global subscriber is
    /// already installed it is left in place.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use recordquery::logging::LogConfig;
    ///
    /// let _guard = LogConfig::debug().with_file("logs/queries.log").init();
    /// ```
    pub fn init(self) -> Option<WorkerGuard> {
        let env_filter = self.env_filter();
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        if matches!(self.output, LogOutput::Stdout | LogOutput::Both(_)) {
            layers.push(self.layer(std::io::stdout, true));
        }

        if let LogOutput::File(path) | LogOutput::Both(path) = &self.output {
            let (directory, file_name) = split_log_path(path);
            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, file_guard) = tracing_appender::non_blocking(appender);
            layers.push(self.layer(writer, false));
            guard = Some(file_guard);
        }

        if tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()
            .is_err()
        {
            tracing::debug!("global subscriber already installed");
        }

        guard
    }
}

/// Split a log path into its directory and file name prefix
fn split_log_path(path: &Path) -> (PathBuf, String) {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (directory, file_name)
}
