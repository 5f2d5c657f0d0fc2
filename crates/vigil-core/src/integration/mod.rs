//! Integration layer - Interfaces to external collaborators.
//!
//! This module contains everything Vigil consumes from the outside world:
//! - The global lifecycle event stream ([`EventSource`], [`LifecycleListener`])
//! - An in-process implementation of that stream ([`EventBus`])
//! - Opaque predicates evaluated against messages ([`Predicate`])
//! - Satisfaction oracles ([`Oracle`])

pub mod bus;
pub mod oracle;
pub mod predicate;
pub mod source;

pub use bus::EventBus;
pub use oracle::{BoxedOracle, Oracle};
pub use predicate::{BoxedPredicate, FnPredicate, Predicate};
pub use source::{EventSource, LifecycleListener, SubscriptionId};
