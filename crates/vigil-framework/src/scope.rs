//! Scope filters for condition groups.
//!
//! A scope decides whether a lifecycle event belongs to a condition group at
//! all. Three kinds exist, mirroring the builder calls that create them:
//!
//! | Builder call        | Filter                 | Canonical form   |
//! |---------------------|------------------------|------------------|
//! | `from(pattern)`     | [`ScopeFilter::Channel`] | `from(pattern)`  |
//! | `from_route(pattern)` | [`ScopeFilter::Route`] | `fromRoute(pattern)` |
//! | `filter(predicate)` | [`ScopeFilter::Filter`]  | `filter(label)`  |
//!
//! Patterns may contain `*` wildcards (`direct:*`, `route-*`). Exact patterns
//! are kept as plain strings so the dispatch table can index them.

use std::fmt;

use regex::Regex;

use crate::error::{BuildError, BuildResult};
use vigil_core::{BoxedPredicate, EvalError, EvalResult, LifecycleEvent};

const WILDCARD: char = '*';

/// A channel or route pattern.
#[derive(Debug, Clone)]
pub enum ScopePattern {
    /// Compared by string equality.
    Exact(String),
    /// A `*` glob compiled to an anchored regular expression.
    Wildcard {
        /// The pattern as written.
        raw: String,
        /// The compiled matcher.
        regex: Regex,
    },
}

impl ScopePattern {
    /// Parses a pattern.
    ///
    /// With `wildcards` disabled, `*` has no special meaning.
    pub fn parse(raw: &str, wildcards: bool) -> BuildResult<Self> {
        if raw.is_empty() {
            return Err(BuildError::invalid_pattern(raw, "pattern is empty"));
        }
        if !wildcards || !raw.contains(WILDCARD) {
            return Ok(Self::Exact(raw.to_string()));
        }

        let body = raw
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{body}$"))
            .map_err(|e| BuildError::invalid_pattern(raw, e.to_string()))?;

        Ok(Self::Wildcard {
            raw: raw.to_string(),
            regex,
        })
    }

    /// Returns `true` if `value` is matched by this pattern.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == value,
            Self::Wildcard { regex, .. } => regex.is_match(value),
        }
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(raw) | Self::Wildcard { raw, .. } => raw,
        }
    }

    /// Returns the literal value if this pattern is exact.
    pub fn exact(&self) -> Option<&str> {
        match self {
            Self::Exact(raw) => Some(raw),
            Self::Wildcard { .. } => None,
        }
    }
}

impl fmt::Display for ScopePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A restriction on which events a condition group observes.
#[derive(Clone)]
pub enum ScopeFilter {
    /// Events whose originating channel matches.
    Channel(ScopePattern),
    /// Events whose route identifier matches. Events without a route never match.
    Route(ScopePattern),
    /// Events whose message satisfies the predicate.
    Filter(BoxedPredicate),
}

impl ScopeFilter {
    /// Decides whether `event` is in scope.
    ///
    /// Only [`ScopeFilter::Filter`] can fail, when its predicate does.
    pub fn accepts(&self, event: &LifecycleEvent) -> EvalResult<bool> {
        match self {
            Self::Channel(pattern) => Ok(pattern.matches(event.channel())),
            Self::Route(pattern) => Ok(event
                .route_id()
                .is_some_and(|route| pattern.matches(route))),
            Self::Filter(predicate) => predicate
                .matches(event.message())
                .map_err(|source| EvalError::predicate(predicate.to_string(), source)),
        }
    }
}

impl fmt::Display for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(pattern) => write!(f, "from({pattern})"),
            Self::Route(pattern) => write!(f, "fromRoute({pattern})"),
            Self::Filter(predicate) => write!(f, "filter({predicate})"),
        }
    }
}

impl fmt::Debug for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeFilter({self})")
    }
}
