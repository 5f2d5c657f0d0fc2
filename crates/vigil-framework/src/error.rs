//! Error types for the Vigil framework.
//!
//! Everything here is a construction error: it is returned by
//! [`NotifyBuilder::create`](crate::NotifyBuilder::create) before any event
//! is processed. Delivery-time failures use [`vigil_core::EvalError`].

use thiserror::Error;

/// Errors that can occur while building a matcher expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A combinator was declared with nothing on its left-hand side.
    #[error("'{combinator}' at step {step} has no preceding clause")]
    DanglingCombinator {
        /// The combinator keyword, e.g. `or()`.
        combinator: &'static str,
        /// Zero-based index of the builder call.
        step: usize,
    },

    /// Two combinators were declared back to back.
    #[error("'{combinator}' at step {step} directly follows another combinator")]
    ConsecutiveCombinators {
        /// The second combinator keyword.
        combinator: &'static str,
        /// Zero-based index of the builder call.
        step: usize,
    },

    /// The expression ends with a combinator that starts no clause.
    #[error("expression ends with a dangling '{combinator}'")]
    TrailingCombinator {
        /// The combinator keyword.
        combinator: &'static str,
    },

    /// A clause declares a scope but no condition.
    #[error("clause '{clause}' has no condition")]
    EmptyGroup {
        /// Canonical form of the scope filters of the clause.
        clause: String,
    },

    /// No clause was declared at all.
    #[error("expression has no clauses")]
    EmptyExpression,

    /// A body-sequence condition was given no expected bodies.
    #[error("'{condition}' expects at least one body")]
    EmptyBodies {
        /// Canonical form of the condition.
        condition: String,
    },

    /// A channel or route pattern could not be compiled.
    #[error("invalid scope pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Reason for failure.
        reason: String,
    },
}

impl BuildError {
    /// Creates an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for expression construction.
pub type BuildResult<T> = Result<T, BuildError>;
