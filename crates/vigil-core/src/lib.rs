//! # Vigil Core
//!
//! The core types of the Vigil lifecycle-event matcher.
//!
//! This crate defines what a matcher observes and which collaborators it
//! talks to. It contains no matching logic itself; conditions, expressions
//! and the matcher live in `vigil-framework`.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! Core abstractions and type system:
//! - **Lifecycle Events**: what the pipeline reports ([`LifecycleEvent`], [`EventKind`], [`Outcome`])
//! - **Messages**: body and header snapshots ([`Message`])
//! - **Errors**: delivery-time failures ([`EvalError`])
//!
//! ### Integration Layer
//!
//! External system interfaces:
//! - **Event Stream**: global subscription ([`EventSource`], [`LifecycleListener`], [`EventBus`])
//! - **Predicates**: opaque message tests ([`Predicate`])
//! - **Oracles**: external expectation state ([`Oracle`])
//!
//! ## Event Flow
//!
//! ```text
//! ┌────────────┐     ┌──────────┐     ┌───────────────────┐
//! │  Pipeline  │────▶│ EventBus │────▶│ LifecycleListener │
//! │  (routes)  │     │          │────▶│ LifecycleListener │
//! └────────────┘     └──────────┘     └───────────────────┘
//! ```

// Architectural layers
pub mod foundation;
pub mod integration;

// Re-export foundation types
pub use foundation::{
    BodyDisplay, BoxError, EvalError, EvalResult, EventKind, LifecycleEvent, Message, Outcome,
};

// Re-export integration types
pub use integration::{
    BoxedOracle, BoxedPredicate, EventBus, EventSource, FnPredicate, LifecycleListener, Oracle,
    Predicate, SubscriptionId, predicate,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::integration::{
        EventBus, EventSource, LifecycleListener, Oracle, Predicate, SubscriptionId,
    };
}
