//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vigil_core::EventSource;
use vigil_framework::{MatcherConfig, NotifyBuilder};

/// Root configuration structure.
///
/// ```toml
/// [logging]
/// level = "debug"
/// format = "pretty"
///
/// [logging.filters]
/// vigil_framework = "trace"
///
/// [matcher]
/// wildcard_scopes = true
/// log_transitions = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VigilConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults applied to every matcher built from this configuration.
    #[serde(default)]
    pub matcher: MatcherConfig,
}

impl VigilConfig {
    /// Starts a matcher on `source` with the configured matcher settings.
    pub fn notify(&self, source: Arc<dyn EventSource>) -> NotifyBuilder {
        NotifyBuilder::on(source).with_config(self.matcher.clone())
    }

    /// Starts a detached matcher with the configured matcher settings.
    pub fn notify_detached(&self) -> NotifyBuilder {
        NotifyBuilder::new().with_config(self.matcher.clone())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base log level. `RUST_LOG` takes precedence when set.
    pub level: LogLevel,

    /// Output format.
    pub format: LogFormat,

    /// Output destination.
    pub output: LogOutput,

    /// Log file, required when `output = "file"`.
    pub file_path: Option<PathBuf>,

    /// How often the log file is rotated.
    pub rotation: LogRotation,

    /// Number of rotated files to keep.
    pub max_files: u32,

    /// Per-module level overrides, e.g. `vigil_framework = "trace"`.
    pub filters: HashMap<String, LogLevel>,

    /// Span lifecycle events to log.
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    pub thread_ids: bool,

    /// Include file names and line numbers.
    pub file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            rotation: LogRotation::Never,
            max_files: 5,
            filters: HashMap::new(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as used in filter directives.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line output.
    #[default]
    Compact,
    /// The default `tracing-subscriber` format.
    Full,
    /// Multi-line, human-oriented output.
    Pretty,
    /// Newline-delimited JSON. Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Log file rotation period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Span lifecycle events to log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEventConfig {
    /// Span creation and close, which bracket every matcher `observe` call.
    pub const BRACKETS: Self = Self {
        new: true,
        enter: false,
        exit: false,
        close: true,
    };
}
