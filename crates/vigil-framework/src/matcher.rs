//! The notify matcher.
//!
//! A [`NotifyMatcher`] is what [`NotifyBuilder::create`](crate::NotifyBuilder::create)
//! returns. It owns a compiled [`Expression`], receives lifecycle events and
//! answers whether the expression currently holds.
//!
//! # Delivery
//!
//! Events reach a matcher in one of two ways:
//!
//! - **Subscribed**: built with [`NotifyBuilder::on`](crate::NotifyBuilder::on),
//!   the matcher registers a listener on the [`EventSource`] and receives every
//!   event the source emits. Dropping the matcher unsubscribes it.
//! - **Detached**: built with [`NotifyBuilder::new`](crate::NotifyBuilder::new),
//!   the caller feeds events through [`NotifyMatcher::observe`].
//!
//! Both paths go through the same code.
//!
//! # Concurrency
//!
//! All condition state sits behind a single lock. `observe`, `matches` and
//! `reset` each hold it for their whole duration, so they are linearized and
//! `matches` never sees a half-applied event.
//!
//! An event is applied in three passes over the groups it reaches: every
//! predicate runs, then every oracle is consulted, and only then do
//! conditions change. A failure in either of the first two passes leaves
//! every condition as it was.
//!
//! Events are applied in the order they reach the matcher. A pipeline that
//! delivers from several worker threads gives no total order across
//! channels; in that case only the per-channel order of the pipeline is
//! preserved. Conditions that depend on order across channels, such as an
//! unscoped body sequence, should only be used with a pipeline that
//! serializes delivery.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{Level, debug, span, trace, warn};

use crate::config::MatcherConfig;
use crate::dispatcher::DispatchTable;
use crate::expression::Expression;
use vigil_core::{EvalError, EvalResult, EventSource, LifecycleEvent, LifecycleListener, SubscriptionId};

struct MatcherState {
    expression: Expression,
    /// Events delivered since creation. Never reset.
    sequence: u64,
    /// Set once an event has been applied. A matcher that has seen nothing
    /// since creation or reset does not match.
    armed: bool,
    /// Last logged value, for transition logging.
    satisfied: bool,
}

struct MatcherInner {
    state: Mutex<MatcherState>,
    table: DispatchTable,
    canonical: String,
    log_transitions: bool,
}

impl MatcherInner {
    fn observe(&self, event: &LifecycleEvent) -> EvalResult<()> {
        let targets = self.table.targets(event);

        let mut state = self.state.lock();
        state.sequence += 1;
        let sequence = state.sequence;

        let span = span!(Level::DEBUG, "observe", sequence);
        let _enter = span.enter();

        trace!(
            channel = event.channel(),
            route = event.route_id().unwrap_or("-"),
            kind = %event.kind(),
            groups = targets.len(),
            "Delivering lifecycle event"
        );

        let mut deliveries = Vec::with_capacity(targets.len());
        for id in targets {
            let Some(group) = state.expression.groups().get(id.index()) else {
                continue;
            };
            match group.evaluate(event) {
                Ok(Some(delivery)) => deliveries.push((id, delivery)),
                Ok(None) => {}
                Err(err) => return Err(self.abort(id.index(), err)),
            }
        }

        for (id, delivery) in &mut deliveries {
            let Some(group) = state.expression.groups().get(id.index()) else {
                continue;
            };
            if let Err(err) = group.consult(event, delivery) {
                return Err(self.abort(id.index(), err));
            }
        }

        for (id, delivery) in deliveries {
            if let Some(group) = state.expression.group_mut(id) {
                group.apply(event, delivery);
            }
        }
        state.armed = true;

        if self.log_transitions {
            let now = state.expression.evaluate();
            if now != state.satisfied {
                state.satisfied = now;
                debug!(
                    expression = %self.canonical,
                    satisfied = now,
                    sequence,
                    "Matcher value changed"
                );
            }
        }

        Ok(())
    }

    fn abort(&self, group: usize, err: EvalError) -> EvalError {
        warn!(
            expression = %self.canonical,
            group,
            error = %err,
            "Condition evaluation failed, aborting delivery"
        );
        err
    }
}

/// Listener registered on an [`EventSource`] on behalf of a matcher.
///
/// Holds a weak reference so an event source that outlives the matcher
/// does not keep its state alive.
struct NotifyListener {
    inner: Weak<MatcherInner>,
}

impl LifecycleListener for NotifyListener {
    fn on_event(&self, event: &LifecycleEvent) -> EvalResult<()> {
        match self.inner.upgrade() {
            Some(inner) => inner.observe(event),
            None => Ok(()),
        }
    }
}

struct Subscription {
    source: Arc<dyn EventSource>,
    id: SubscriptionId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.source.unsubscribe(self.id) {
            debug!(subscription = %self.id, "Matcher unsubscribed");
        }
    }
}

/// A live, queryable event-condition expression.
///
/// Created by [`NotifyBuilder`](crate::NotifyBuilder). Its `Display` output is
/// the canonical form of the expression:
///
/// ```rust,ignore
/// let matcher = NotifyBuilder::on(bus.clone())
///     .from("direct:foo").when_done(5)
///     .or()
///     .from("direct:bar").when_done(7)
///     .create()?;
///
/// assert_eq!(
///     matcher.to_string(),
///     "from(direct:foo).whenDone(5).or().from(direct:bar).whenDone(7)"
/// );
/// ```
pub struct NotifyMatcher {
    inner: Arc<MatcherInner>,
    subscription: Option<Subscription>,
}

impl NotifyMatcher {
    pub(crate) fn new(expression: Expression, config: &MatcherConfig) -> Self {
        let table = DispatchTable::build(&expression);
        let canonical = expression.to_string();

        debug!(
            expression = %canonical,
            groups = expression.groups().len(),
            registrations = table.registration_count(),
            "Matcher created"
        );

        Self {
            inner: Arc::new(MatcherInner {
                state: Mutex::new(MatcherState {
                    expression,
                    sequence: 0,
                    armed: false,
                    satisfied: false,
                }),
                table,
                canonical,
                log_transitions: config.log_transitions,
            }),
            subscription: None,
        }
    }

    pub(crate) fn subscribe(mut self, source: Arc<dyn EventSource>) -> Self {
        let listener: Arc<dyn LifecycleListener> = Arc::new(NotifyListener {
            inner: Arc::downgrade(&self.inner),
        });
        let id = source.subscribe(listener);
        debug!(subscription = %id, expression = %self.inner.canonical, "Matcher subscribed");

        self.subscription = Some(Subscription { source, id });
        self
    }

    /// Returns whether the expression holds, evaluated fresh.
    ///
    /// Always `false` until an event has been applied since creation or the
    /// last reset.
    pub fn matches(&self) -> bool {
        let state = self.inner.state.lock();
        state.armed && state.expression.evaluate()
    }

    /// Clears all condition state. The expression itself is unchanged and
    /// the event sequence keeps counting.
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        state.expression.reset();
        state.armed = false;
        state.satisfied = false;
        debug!(
            expression = %self.inner.canonical,
            sequence = state.sequence,
            "Matcher reset"
        );
    }

    /// Delivers an event directly.
    ///
    /// # Errors
    ///
    /// Returns the first predicate or oracle failure. Condition state is
    /// left as it was before the event. Oracles consulted before the failure
    /// keep the message they recorded.
    pub fn observe(&self, event: &LifecycleEvent) -> EvalResult<()> {
        self.inner.observe(event)
    }

    /// Number of events delivered since creation, including those no group
    /// was interested in.
    pub fn events_observed(&self) -> u64 {
        self.inner.state.lock().sequence
    }

    /// The subscription held on the event source, if any.
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(|s| s.id)
    }
}

impl fmt::Display for NotifyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.canonical)
    }
}

impl fmt::Debug for NotifyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("NotifyMatcher")
            .field("expression", &self.inner.canonical)
            .field("sequence", &state.sequence)
            .field("subscription", &self.subscription_id())
            .finish()
    }
}
