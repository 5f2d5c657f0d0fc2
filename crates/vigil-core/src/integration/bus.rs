//! In-process event bus.
//!
//! [`EventBus`] is the reference [`EventSource`]: the pipeline (or a test
//! harness) calls [`EventBus::emit`] from whichever worker thread finished a
//! step, and every subscribed listener runs synchronously on that thread.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vigil_core::{EventBus, LifecycleEvent};
//!
//! let bus = Arc::new(EventBus::new());
//! bus.emit(&LifecycleEvent::received("direct:foo", "A").with_route("foo"))?;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use super::source::{EventSource, LifecycleListener, SubscriptionId};
use crate::foundation::error::{EvalError, EvalResult};
use crate::foundation::event::LifecycleEvent;

/// A synchronous fan-out bus for lifecycle events.
///
/// # Thread Safety
///
/// `EventBus` is `Send + Sync`. Emitting takes a snapshot of the listener
/// list, so listeners may subscribe or unsubscribe while another thread is
/// emitting; the change applies from the next event on.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(SubscriptionId, Arc<dyn LifecycleListener>)>>,
}

impl EventBus {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Delivers an event to every listener in subscription order.
    ///
    /// All listeners see the event even if one of them fails; the first error
    /// is returned.
    pub fn emit(&self, event: &LifecycleEvent) -> EvalResult<()> {
        let listeners: Vec<_> = self
            .listeners
            .read()
            .iter()
            .map(|(id, l)| (*id, Arc::clone(l)))
            .collect();

        trace!(
            channel = event.channel(),
            route = event.route_id().unwrap_or("-"),
            kind = %event.kind(),
            listeners = listeners.len(),
            "Emitting lifecycle event"
        );

        let mut first_error: Option<EvalError> = None;
        for (id, listener) in listeners {
            if let Err(err) = listener.on_event(event) {
                warn!(subscription = %id, error = %err, "Listener failed to handle event");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, listener: Arc<dyn LifecycleListener>) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        debug!(subscription = %id, "Listener subscribed");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        let removed = listeners.len() != before;
        if removed {
            debug!(subscription = %id, "Listener unsubscribed");
        }
        removed
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}
