//! Lifecycle event subscription interface.
//!
//! The pipeline exposes a single global stream of lifecycle events. Matchers
//! subscribe once as a [`LifecycleListener`] and do their own scope filtering,
//! so an [`EventSource`] never needs to know what a listener is interested in.

use std::fmt;
use std::sync::Arc;

use crate::foundation::error::EvalResult;
use crate::foundation::event::LifecycleEvent;

/// Identifier handed out by [`EventSource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wraps a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Receives every lifecycle event emitted by a source.
///
/// Called synchronously on the emitting thread. Several threads may call
/// `on_event` concurrently; implementations serialize internally.
pub trait LifecycleListener: Send + Sync {
    /// Handles one event.
    ///
    /// Errors come from collaborators evaluated during delivery and are
    /// returned to the emitter unchanged.
    fn on_event(&self, event: &LifecycleEvent) -> EvalResult<()>;
}

/// A global stream of lifecycle events.
pub trait EventSource: Send + Sync {
    /// Registers a listener for all subsequent events.
    fn subscribe(&self, listener: Arc<dyn LifecycleListener>) -> SubscriptionId;

    /// Removes a listener. Returns `false` if the id was unknown.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
