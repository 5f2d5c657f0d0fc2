//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file extension is unknown or its format feature is disabled.
    #[error("Unsupported or disabled configuration file format: .{0}")]
    UnsupportedFormat(String),

    /// Sources could not be merged into a [`VigilConfig`](super::VigilConfig).
    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    ValidationError { message: String },

    /// A logging filter directive is malformed.
    #[error("Invalid log filter for '{module}': {reason}")]
    InvalidFilter { module: String, reason: String },
}

impl ConfigError {
    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// Creates an invalid filter error.
    pub fn invalid_filter(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
