//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! # Log Levels
//!
//! - `error`: Render failures caught by the boundary, unreadable catalogs
//! - `warn`: Settings fallbacks, suspicious catalog entries
//! - `info`: Catalog loads, bookings
//! - `debug`: Store actions, dropdown and popover transitions
//! - `trace`: Listener attach/detach
//!
//! # Usage
//!
//! ```ignore
//! use medbook_cli::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_verbosity(1);
//! init_logging(&config).expect("init logging");
//! ```

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Maximum level for the medbook crates.
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter` when set.
    pub use_env_filter: bool,
    /// Whether to use ANSI colors in the human-readable formats.
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Optional log file path. When set, logs are written to the file.
    pub log_file: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Full event lines with span context, without timestamps.
    #[default]
    Pretty,
    /// Single-line events without timestamps.
    Compact,
    /// Timestamped JSON objects, one per line.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl LogConfig {
    /// Create a `LogConfig` from a `-v` count.
    ///
    /// - 0: warn
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+: trace
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level_filter = match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        Self {
            level_filter,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the log file path (writes to stderr when None).
    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    /// The filter directive this configuration resolves to, ignoring
    /// `RUST_LOG`.
    pub fn directive(&self) -> String {
        let level = self.level_filter.to_string().to_lowercase();
        format!("warn,medbook_cli={level},medbook_core={level},medbook_model={level}")
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            init_logging_with_writer(config, SharedWriter::new(file));
        }
        None => init_logging_with_writer(config, io::stderr),
    }
    Ok(())
}

/// Initialize logging with a custom writer.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    subscriber(config, writer).init();
}

/// The subscriber `init_logging_with_writer` installs.
fn subscriber<W>(config: &LogConfig, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let output: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_ansi(config.with_ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .without_time()
            .with_target(false)
            .with_ansi(config.with_ansi)
            .with_writer(writer)
            .boxed(),
    };
    tracing_subscriber::registry()
        .with(output)
        .with(build_env_filter(config))
}

/// Hands out writers that append to one shared target, such as the log file.
#[derive(Clone)]
struct SharedWriter<T> {
    target: Arc<Mutex<T>>,
}

impl<T> SharedWriter<T> {
    fn new(target: T) -> Self {
        Self {
            target: Arc::new(Mutex::new(target)),
        }
    }
}

struct SharedWriterGuard<T> {
    target: Arc<Mutex<T>>,
}

impl<T: Write> Write for SharedWriterGuard<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.target
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.target
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?
            .flush()
    }
}

impl<'a, T: Write> MakeWriter<'a> for SharedWriter<T> {
    type Writer = SharedWriterGuard<T>;

    fn make_writer(&'a self) -> Self::Writer {
        SharedWriterGuard {
            target: Arc::clone(&self.target),
        }
    }
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    if config.use_env_filter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::new(config.directive())
}
