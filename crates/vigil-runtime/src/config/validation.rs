//! Configuration validation utilities.

use tracing_subscriber::filter::Directive;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, VigilConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &VigilConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates logging configuration.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File {
        match &logging.file_path {
            None => {
                return Err(ConfigError::validation(
                    "File output requires logging.file_path",
                ));
            }
            Some(path) if path.file_name().is_none() => {
                return Err(ConfigError::validation(format!(
                    "Log file path has no file name: {}",
                    path.display()
                )));
            }
            Some(_) => {}
        }
    }

    if logging.max_files == 0 {
        return Err(ConfigError::validation(
            "logging.max_files must be greater than 0",
        ));
    }

    for (module, level) in &logging.filters {
        validate_filter(module, level.as_str())?;
    }

    Ok(())
}

/// Validates a single `module=level` filter directive.
fn validate_filter(module: &str, level: &str) -> ConfigResult<()> {
    if module.is_empty() {
        return Err(ConfigError::invalid_filter(module, "module name is empty"));
    }
    if module.contains(char::is_whitespace) || module.contains('=') {
        return Err(ConfigError::invalid_filter(
            module,
            "module name must not contain whitespace or '='",
        ));
    }

    format!("{module}={level}")
        .parse::<Directive>()
        .map(|_| ())
        .map_err(|e| ConfigError::invalid_filter(module, e.to_string()))
}
