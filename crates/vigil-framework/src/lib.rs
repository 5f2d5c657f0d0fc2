//! # Vigil Framework
//!
//! Declarative event-condition matching over lifecycle events.
//!
//! This layer provides:
//! - [`NotifyBuilder`]: a fluent DSL for describing what should have happened
//! - [`NotifyMatcher`]: a live, thread-safe evaluation of that description
//! - Condition families (counts, predicates, body sequences, oracles)
//! - Scope filters by channel, route or predicate, with `*` wildcards
//! - A per-matcher dispatch table that routes events to interested groups
//!
//! The framework is built on the collaborator traits of `vigil-core` and
//! does not care where lifecycle events come from.
//!
//! ```rust,ignore
//! use vigil_framework::NotifyBuilder;
//!
//! let notify = NotifyBuilder::on(bus.clone())
//!     .from("direct:foo").when_done(1)
//!     .create()?;
//!
//! // ... drive the pipeline ...
//!
//! assert!(notify.matches());
//! ```

pub mod builder;
pub mod condition;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod expression;
pub mod group;
pub mod matcher;
pub mod scope;

pub use builder::NotifyBuilder;
pub use condition::{
    BodiesCondition, Condition, CountCondition, CountKind, CountMode, Expectation, Interest,
    MatchesCondition, OracleCondition, Phase, Quantifier,
};
pub use config::MatcherConfig;
pub use dispatcher::DispatchTable;
pub use error::{BuildError, BuildResult};
pub use expression::{Expression, GroupId, Joint, Node};
pub use group::ConditionGroup;
pub use matcher::NotifyMatcher;
pub use scope::{ScopeFilter, ScopePattern};
