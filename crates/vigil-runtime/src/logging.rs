//! Logging setup for Vigil.
//!
//! Matchers log their creation, value transitions and resets at `debug`, and
//! every delivered event at `trace` inside an `observe` span. Turning on span
//! creation and close events brackets each delivery in the output.
//!
//! ```rust,ignore
//! use vigil_runtime::{config::load_config, logging};
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! Or, without a config file:
//!
//! ```rust,ignore
//! use vigil_runtime::{LoggingBuilder, SpanEventConfig};
//!
//! LoggingBuilder::new()
//!     .directive("vigil_framework=trace")
//!     .span_events(SpanEventConfig::BRACKETS)
//!     .init();
//! ```

use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

const DEFAULT_LOG_FILE: &str = "vigil.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Builds and installs a `tracing` subscriber.
#[derive(Debug, Default)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    /// Extra filter directives, applied after the per-module filters.
    directives: Vec<String>,
}

impl LoggingBuilder {
    /// A builder with default settings: `info`, compact, stdout.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder for the given configuration.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            config: config.clone(),
            directives: Vec::new(),
        }
    }

    /// Adds a filter directive, e.g. `vigil_framework=trace`.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    /// Sets which span transitions are logged.
    pub fn span_events(mut self, events: SpanEventConfig) -> Self {
        self.config.span_events = events;
        self
    }

    /// Installs the subscriber, ignoring an already installed one.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let layer = self.fmt_layer(self.writer());
        tracing_subscriber::registry()
            .with(layer)
            .with(self.filter())
            .try_init()
    }

    /// Directives in the order they are applied: module filters sorted by
    /// module, then those added with [`directive`](Self::directive).
    fn directive_list(&self) -> Vec<String> {
        let mut modules: Vec<_> = self.config.filters.iter().collect();
        modules.sort_by(|a, b| a.0.cmp(b.0));
        modules
            .into_iter()
            .map(|(module, level)| format!("{module}={level}"))
            .chain(self.directives.iter().cloned())
            .collect()
    }

    /// `RUST_LOG`, when set, replaces the configured level. Directives are
    /// added on top either way.
    fn filter(&self) -> EnvFilter {
        let base = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_str()));

        self.directive_list()
            .into_iter()
            .fold(base, |filter, directive| match directive.parse() {
                Ok(d) => filter.add_directive(d),
                Err(e) => {
                    warn!(%directive, error = %e, "Ignoring invalid log directive");
                    filter
                }
            })
    }

    fn writer(&self) -> BoxMakeWriter {
        match self.config.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File => match self.file_appender() {
                Some(appender) => BoxMakeWriter::new(appender),
                None => {
                    warn!("File output requested but no usable file path, falling back to stdout");
                    BoxMakeWriter::new(std::io::stdout)
                }
            },
        }
    }

    fn fmt_layer(&self, writer: BoxMakeWriter) -> BoxedLayer {
        let location = self.config.file_location;
        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(fmt_span(self.config.span_events))
            .with_thread_ids(self.config.thread_ids)
            .with_file(location)
            .with_line_number(location);

        match self.config.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
        }
    }

    fn file_appender(&self) -> Option<RollingFileAppender> {
        let path = self.config.file_path.as_deref()?;
        let (directory, file_name) = split_log_path(path);

        RollingFileAppender::builder()
            .rotation(rotation(self.config.rotation))
            .filename_prefix(file_name)
            .max_log_files((self.config.max_files as usize).max(1))
            .build(directory)
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "Failed to open log file"))
            .ok()
    }
}

/// Splits a log path into the directory to create files in and the file
/// name prefix. A bare file name lands in the working directory.
fn split_log_path(path: &Path) -> (PathBuf, &str) {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);
    (directory, file_name)
}

fn fmt_span(events: SpanEventConfig) -> FmtSpan {
    [
        (events.new, FmtSpan::NEW),
        (events.enter, FmtSpan::ENTER),
        (events.exit, FmtSpan::EXIT),
        (events.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(on, _)| *on)
    .fold(FmtSpan::NONE, |acc, (_, flag)| acc | flag)
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Never => Rotation::NEVER,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
    }
}
