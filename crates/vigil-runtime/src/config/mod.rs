//! Configuration module for the Vigil runtime.
//!
//! This module provides layered loading (figment) and validation of the
//! logging and matcher settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig, VigilConfig,
};
pub use validation::validate_config;
