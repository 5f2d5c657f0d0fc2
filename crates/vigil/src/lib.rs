//! # Vigil
//!
//! Declarative event-condition matching over the lifecycle events of a
//! message-processing pipeline.
//!
//! ## Overview
//!
//! A pipeline moves messages ("exchanges") through named channels and
//! routes and reports, for every exchange, when it was received and when it
//! finished, successfully or not. Vigil lets you describe what should have
//! happened with a fluent builder and then ask, at any time, whether it did:
//!
//! - "at least 5 exchanges from `direct:foo` finished"
//! - "exactly one exchange failed"
//! - "the bodies `Hi World`, `Hello World` were received in order"
//! - any AND / OR / NOT combination of the above
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌──────────┐     ┌────────────────────────────────────────┐
//! │  Pipeline  │────▶│ EventBus │────▶│ NotifyMatcher                          │
//! │  (routes)  │     │          │     │  dispatch table ─▶ groups ─▶ conditions │
//! └────────────┘     └──────────┘     │  expression tree ─▶ matches()          │
//!                                     └────────────────────────────────────────┘
//! ```
//!
//! - **Core** (`vigil-core`): lifecycle events, messages and collaborator traits
//! - **Framework** (`vigil-framework`): conditions, expressions and the matcher
//! - **Runtime** (`vigil-runtime`): configuration loading and logging setup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vigil::prelude::*;
//!
//! let bus = Arc::new(EventBus::new());
//! let notify = NotifyBuilder::on(bus.clone())
//!     .from("direct:foo").when_done(5)
//!     .or()
//!     .when_failed(1)
//!     .create()?;
//!
//! // ... pipeline emits lifecycle events on `bus` ...
//!
//! assert!(notify.matches());
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use vigil_core as core;
pub use vigil_framework as framework;
pub use vigil_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use vigil::prelude::*;
/// ```
pub mod prelude {
    // Building and querying matchers
    pub use vigil_framework::{BuildError, BuildResult, MatcherConfig, NotifyBuilder, NotifyMatcher};

    // Events and the in-process event stream
    pub use vigil_core::{
        EvalError, EvalResult, EventBus, EventKind, EventSource, LifecycleEvent,
        LifecycleListener, Message, Outcome, SubscriptionId,
    };

    // Collaborators
    pub use vigil_core::{BoxError, BoxedOracle, FnPredicate, Oracle, Predicate, predicate};

    // Configuration
    pub use vigil_runtime::{ConfigLoader, VigilConfig};
}
