//! Vigil Runtime - configuration and logging for Vigil matchers.
//!
//! This crate provides:
//! - Layered configuration loading with figment (`ConfigLoader`)
//! - Configuration validation (`validate_config`)
//! - `tracing-subscriber` setup driven by that configuration (`LoggingBuilder`)
//!
//! ```ignore
//! use vigil_runtime::{ConfigLoader, logging, validate_config};
//!
//! let config = ConfigLoader::new().load()?;
//! validate_config(&config)?;
//! logging::init_from_config(&config.logging);
//!
//! let notify = config
//!     .notify(bus.clone())
//!     .from("direct:orders").when_done(10)
//!     .create()?;
//! ```

pub mod config;
pub mod logging;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, Profile, SpanEventConfig, VigilConfig, load_config, load_config_from_file,
    validate_config,
};
pub use logging::{LoggingBuilder, init_from_config};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
