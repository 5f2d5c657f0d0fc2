//! Predicate collaborator interface.
//!
//! Vigil never interprets predicate internals. A predicate is an opaque
//! callable over a [`Message`] with a human-readable description that is
//! embedded into canonical expression strings (`filter(body contains World)`).

use std::fmt;
use std::sync::Arc;

use crate::foundation::error::BoxError;
use crate::foundation::message::Message;

/// A boolean test over a message.
///
/// The `Display` implementation is the description shown in canonical
/// expression strings, so it should be stable and concise.
pub trait Predicate: fmt::Display + Send + Sync {
    /// Evaluates the predicate against a message.
    ///
    /// An `Err` means the predicate itself is broken (for example it expected
    /// a structured body). It is propagated to the event producer and never
    /// treated as `false`.
    fn matches(&self, message: &Message) -> Result<bool, BoxError>;
}

/// Shared, type-erased predicate.
pub type BoxedPredicate = Arc<dyn Predicate>;

type PredicateFn = dyn Fn(&Message) -> Result<bool, BoxError> + Send + Sync;

/// A predicate backed by a closure and a label.
pub struct FnPredicate {
    label: String,
    f: Box<PredicateFn>,
}

impl Predicate for FnPredicate {
    fn matches(&self, message: &Message) -> Result<bool, BoxError> {
        (self.f)(message)
    }
}

impl fmt::Display for FnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl fmt::Debug for FnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate")
            .field("label", &self.label)
            .finish()
    }
}

/// Creates a predicate from an infallible closure.
///
/// # Example
///
/// ```rust,ignore
/// let contains_world = predicate::from_fn("body contains World", |msg| {
///     msg.body_text().is_some_and(|b| b.contains("World"))
/// });
/// ```
pub fn from_fn<F>(label: impl Into<String>, f: F) -> FnPredicate
where
    F: Fn(&Message) -> bool + Send + Sync + 'static,
{
    FnPredicate {
        label: label.into(),
        f: Box::new(move |msg| Ok(f(msg))),
    }
}

/// Creates a predicate from a fallible closure.
pub fn try_from_fn<F>(label: impl Into<String>, f: F) -> FnPredicate
where
    F: Fn(&Message) -> Result<bool, BoxError> + Send + Sync + 'static,
{
    FnPredicate {
        label: label.into(),
        f: Box::new(f),
    }
}
