//! Error types raised while delivering events to matchers.
//!
//! Construction errors live in `vigil-framework`; this module only covers
//! failures that happen at delivery time, which always originate in an
//! external collaborator (a predicate or an oracle).

use thiserror::Error;

/// Boxed error returned by collaborator implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Evaluation Errors
// =============================================================================

/// Errors surfaced while a matcher observes an event.
///
/// These are never converted into a `false` condition value: a failing
/// predicate means the matcher is misconfigured, so the error is returned to
/// whoever delivered the event.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A predicate returned an error.
    #[error("predicate '{predicate}' failed: {source}")]
    Predicate {
        /// Description of the predicate.
        predicate: String,
        /// The collaborator's error.
        source: BoxError,
    },

    /// An oracle returned an error while recording or being queried.
    #[error("oracle '{oracle}' failed: {source}")]
    Oracle {
        /// Name of the oracle.
        oracle: String,
        /// The collaborator's error.
        source: BoxError,
    },
}

impl EvalError {
    /// Creates a predicate error.
    pub fn predicate(predicate: impl Into<String>, source: BoxError) -> Self {
        Self::Predicate {
            predicate: predicate.into(),
            source,
        }
    }

    /// Creates an oracle error.
    pub fn oracle(oracle: impl Into<String>, source: BoxError) -> Self {
        Self::Oracle {
            oracle: oracle.into(),
            source,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for event delivery.
pub type EvalResult<T> = Result<T, EvalError>;
