//! Matcher configuration.
//!
//! [`MatcherConfig`] is the `matcher` section of the Vigil configuration
//! file. It is plain serde data so the runtime crate can load it with the
//! rest of the configuration and hand it to
//! [`NotifyBuilder::with_config`](crate::NotifyBuilder::with_config).
//!
//! ```toml
//! [matcher]
//! wildcard_scopes = true
//! log_transitions = false
//! ```

use serde::{Deserialize, Serialize};

/// Options that affect how matchers are built and instrumented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Treat `*` in `from` / `fromRoute` scopes as a wildcard.
    ///
    /// When disabled every scope is compared literally.
    pub wildcard_scopes: bool,

    /// Log at `debug` level whenever an expression's value flips.
    pub log_transitions: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            wildcard_scopes: true,
            log_transitions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: MatcherConfig = serde_json::from_str(r#"{"log_transitions": false}"#).unwrap();
        assert!(config.wildcard_scopes);
        assert!(!config.log_transitions);
    }
}
