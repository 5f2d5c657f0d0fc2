//! Fluent construction of notify matchers.
//!
//! [`NotifyBuilder`] is a deferred DSL: every call appends a step and nothing
//! is validated until [`create`](NotifyBuilder::create) folds the steps into
//! an [`Expression`]. Errors therefore surface in one place, with the index
//! of the offending call.
//!
//! # Grammar
//!
//! ```text
//! expression := [not()] clause (joint clause)*
//! joint      := and() | or() | not() | <implicit>
//! clause     := scope* condition+
//! scope      := from(pattern) | from_route(pattern) | filter(predicate)
//! ```
//!
//! A scope call that follows a condition starts a new clause joined by an
//! implicit AND. Combinators join the new clause with everything declared
//! before it, left to right.
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_framework::NotifyBuilder;
//!
//! let notify = NotifyBuilder::on(bus.clone())
//!     .from("direct:foo").when_done(5)
//!     .not()
//!     .from("direct:bar").when_done(1)
//!     .create()?;
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::condition::{
    BodiesCondition, Condition, CountCondition, CountKind, CountMode, Expectation,
    MatchesCondition, OracleCondition, Phase, Quantifier,
};
use crate::config::MatcherConfig;
use crate::error::{BuildError, BuildResult};
use crate::expression::{Clause, Expression, Joint};
use crate::group::ConditionGroup;
use crate::matcher::NotifyMatcher;
use crate::scope::{ScopeFilter, ScopePattern};
use vigil_core::{BoxedOracle, BoxedPredicate, EventSource, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    And,
    Or,
    Not,
}

impl Combinator {
    fn keyword(self) -> &'static str {
        match self {
            Self::And => "and()",
            Self::Or => "or()",
            Self::Not => "not()",
        }
    }

    fn joint(self) -> Joint {
        match self {
            Self::And => Joint::And,
            Self::Or => Joint::Or,
            Self::Not => Joint::Not,
        }
    }
}

enum ScopeSpec {
    Channel(String),
    Route(String),
    Filter(BoxedPredicate),
}

impl ScopeSpec {
    fn compile(self, config: &MatcherConfig) -> BuildResult<ScopeFilter> {
        Ok(match self {
            Self::Channel(raw) => {
                ScopeFilter::Channel(ScopePattern::parse(&raw, config.wildcard_scopes)?)
            }
            Self::Route(raw) => {
                ScopeFilter::Route(ScopePattern::parse(&raw, config.wildcard_scopes)?)
            }
            Self::Filter(predicate) => ScopeFilter::Filter(predicate),
        })
    }
}

enum Step {
    Scope(ScopeSpec),
    Condition(Condition),
    Combinator(Combinator),
}

/// A clause under construction.
struct Pending {
    joint: Joint,
    filters: Vec<ScopeFilter>,
    conditions: Vec<Condition>,
}

impl Pending {
    fn new(joint: Joint) -> Self {
        Self {
            joint,
            filters: Vec::new(),
            conditions: Vec::new(),
        }
    }

    fn finish(self) -> BuildResult<Clause> {
        if self.conditions.is_empty() {
            let clause = self
                .filters
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".");
            return Err(BuildError::EmptyGroup { clause });
        }
        Ok(Clause {
            joint: self.joint,
            group: ConditionGroup::new(self.filters, self.conditions),
        })
    }
}

/// Builder for [`NotifyMatcher`].
///
/// See the [module documentation](self) for the grammar.
pub struct NotifyBuilder {
    steps: Vec<Step>,
    config: MatcherConfig,
    source: Option<Arc<dyn EventSource>>,
}

impl Default for NotifyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyBuilder {
    /// Creates a builder for a detached matcher, fed through
    /// [`NotifyMatcher::observe`].
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            config: MatcherConfig::default(),
            source: None,
        }
    }

    /// Creates a builder for a matcher that subscribes to `source` on
    /// creation.
    pub fn on(source: Arc<dyn EventSource>) -> Self {
        Self {
            source: Some(source),
            ..Self::new()
        }
    }

    /// Replaces the matcher configuration.
    pub fn with_config(mut self, config: MatcherConfig) -> Self {
        self.config = config;
        self
    }

    fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    fn condition(self, condition: impl Into<Condition>) -> Self {
        self.step(Step::Condition(condition.into()))
    }

    // ------------------------------------------------------------------
    // Scope
    // ------------------------------------------------------------------

    /// Restricts the clause to events from channels matching `pattern`.
    pub fn from(self, pattern: impl Into<String>) -> Self {
        self.step(Step::Scope(ScopeSpec::Channel(pattern.into())))
    }

    /// Restricts the clause to events from routes matching `pattern`.
    pub fn from_route(self, pattern: impl Into<String>) -> Self {
        self.step(Step::Scope(ScopeSpec::Route(pattern.into())))
    }

    /// Restricts the clause to messages satisfying `predicate`.
    pub fn filter(self, predicate: impl Predicate + 'static) -> Self {
        self.filter_boxed(Arc::new(predicate))
    }

    /// Like [`filter`](Self::filter) for an already shared predicate.
    pub fn filter_boxed(self, predicate: BoxedPredicate) -> Self {
        self.step(Step::Scope(ScopeSpec::Filter(predicate)))
    }

    // ------------------------------------------------------------------
    // Counting
    // ------------------------------------------------------------------

    fn count(self, kind: CountKind, mode: CountMode, target: usize) -> Self {
        self.condition(CountCondition::new(kind, mode, target))
    }

    /// At least `n` exchanges received.
    pub fn when_received(self, n: usize) -> Self {
        self.count(CountKind::Received, CountMode::AtLeast, n)
    }

    /// At least `n` exchanges finished, with any outcome.
    pub fn when_done(self, n: usize) -> Self {
        self.count(CountKind::Done, CountMode::AtLeast, n)
    }

    /// At least `n` exchanges completed successfully.
    pub fn when_completed(self, n: usize) -> Self {
        self.count(CountKind::Completed, CountMode::AtLeast, n)
    }

    /// At least `n` exchanges failed.
    pub fn when_failed(self, n: usize) -> Self {
        self.count(CountKind::Failed, CountMode::AtLeast, n)
    }

    /// Exactly `n` exchanges finished.
    pub fn when_exactly_done(self, n: usize) -> Self {
        self.count(CountKind::Done, CountMode::Exactly, n)
    }

    /// Exactly `n` exchanges completed successfully.
    pub fn when_exactly_completed(self, n: usize) -> Self {
        self.count(CountKind::Completed, CountMode::Exactly, n)
    }

    /// Exactly `n` exchanges failed.
    pub fn when_exactly_failed(self, n: usize) -> Self {
        self.count(CountKind::Failed, CountMode::Exactly, n)
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    fn matching(self, phase: Phase, quantifier: Quantifier, predicate: BoxedPredicate) -> Self {
        self.condition(MatchesCondition::new(phase, quantifier, predicate))
    }

    /// Any received message satisfies `predicate`.
    pub fn when_any_received_matches(self, predicate: impl Predicate + 'static) -> Self {
        self.matching(Phase::Received, Quantifier::Any, Arc::new(predicate))
    }

    /// Every received message satisfies `predicate`.
    pub fn when_all_received_matches(self, predicate: impl Predicate + 'static) -> Self {
        self.matching(Phase::Received, Quantifier::All, Arc::new(predicate))
    }

    /// Any finished message satisfies `predicate`.
    pub fn when_any_done_matches(self, predicate: impl Predicate + 'static) -> Self {
        self.matching(Phase::Done, Quantifier::Any, Arc::new(predicate))
    }

    /// Every finished message satisfies `predicate`.
    pub fn when_all_done_matches(self, predicate: impl Predicate + 'static) -> Self {
        self.matching(Phase::Done, Quantifier::All, Arc::new(predicate))
    }

    // ------------------------------------------------------------------
    // Body sequences
    // ------------------------------------------------------------------

    fn bodies<I, V>(self, phase: Phase, exact: bool, bodies: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let expected = bodies.into_iter().map(Into::into).collect();
        self.condition(BodiesCondition::new(phase, exact, expected))
    }

    /// The received bodies start with `bodies`, in order.
    pub fn when_bodies_received<I, V>(self, bodies: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.bodies(Phase::Received, false, bodies)
    }

    /// The finished bodies start with `bodies`, in order.
    pub fn when_bodies_done<I, V>(self, bodies: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.bodies(Phase::Done, false, bodies)
    }

    /// The received bodies are exactly `bodies`.
    pub fn when_exact_bodies_received<I, V>(self, bodies: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.bodies(Phase::Received, true, bodies)
    }

    /// The finished bodies are exactly `bodies`.
    pub fn when_exact_bodies_done<I, V>(self, bodies: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.bodies(Phase::Done, true, bodies)
    }

    // ------------------------------------------------------------------
    // Oracles
    // ------------------------------------------------------------------

    fn oracle(self, phase: Phase, expectation: Expectation, oracle: BoxedOracle) -> Self {
        self.condition(OracleCondition::new(phase, expectation, oracle))
    }

    /// `oracle` is satisfied after being fed the received messages.
    pub fn when_received_satisfied(self, oracle: BoxedOracle) -> Self {
        self.oracle(Phase::Received, Expectation::Satisfied, oracle)
    }

    /// `oracle` is not satisfied after being fed the received messages.
    pub fn when_received_not_satisfied(self, oracle: BoxedOracle) -> Self {
        self.oracle(Phase::Received, Expectation::NotSatisfied, oracle)
    }

    /// `oracle` is satisfied after being fed the finished messages.
    pub fn when_done_satisfied(self, oracle: BoxedOracle) -> Self {
        self.oracle(Phase::Done, Expectation::Satisfied, oracle)
    }

    /// `oracle` is not satisfied after being fed the finished messages.
    pub fn when_done_not_satisfied(self, oracle: BoxedOracle) -> Self {
        self.oracle(Phase::Done, Expectation::NotSatisfied, oracle)
    }

    // ------------------------------------------------------------------
    // Combinators
    // ------------------------------------------------------------------

    /// Joins the next clause with everything so far by AND.
    pub fn and(self) -> Self {
        self.step(Step::Combinator(Combinator::And))
    }

    /// Joins the next clause with everything so far by OR.
    pub fn or(self) -> Self {
        self.step(Step::Combinator(Combinator::Or))
    }

    /// Negates the next clause and joins it by AND. As the first call,
    /// negates the first clause.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        self.step(Step::Combinator(Combinator::Not))
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Validates the steps and creates the matcher.
    ///
    /// A builder created with [`on`](Self::on) subscribes the matcher to its
    /// source before returning.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] for dangling, doubled or trailing
    /// combinators, clauses without conditions, empty expressions, empty
    /// body lists and invalid scope patterns.
    pub fn create(self) -> BuildResult<NotifyMatcher> {
        let Self {
            steps,
            config,
            source,
        } = self;

        let expression = fold_steps(steps, &config)?;
        let matcher = NotifyMatcher::new(expression, &config);

        Ok(match source {
            Some(source) => matcher.subscribe(source),
            None => matcher,
        })
    }
}

fn fold_steps(steps: Vec<Step>, config: &MatcherConfig) -> BuildResult<Expression> {
    let mut clauses: Vec<Clause> = Vec::new();
    let mut current: Option<Pending> = None;
    let mut pending_joint: Option<Combinator> = None;

    for (index, step) in steps.into_iter().enumerate() {
        match step {
            Step::Combinator(combinator) => {
                if pending_joint.is_some() {
                    return Err(BuildError::ConsecutiveCombinators {
                        combinator: combinator.keyword(),
                        step: index,
                    });
                }
                match current.take() {
                    Some(pending) => clauses.push(pending.finish()?),
                    None if clauses.is_empty() && combinator != Combinator::Not => {
                        return Err(BuildError::DanglingCombinator {
                            combinator: combinator.keyword(),
                            step: index,
                        });
                    }
                    None => {}
                }
                pending_joint = Some(combinator);
            }
            Step::Scope(spec) => {
                let filter = spec.compile(config)?;
                if current.as_ref().is_some_and(|p| !p.conditions.is_empty()) {
                    if let Some(pending) = current.take() {
                        clauses.push(pending.finish()?);
                    }
                    current = Some(Pending::new(Joint::Implicit));
                }
                current
                    .get_or_insert_with(|| start(&clauses, pending_joint.take()))
                    .filters
                    .push(filter);
            }
            Step::Condition(condition) => {
                if matches!(&condition, Condition::Bodies(b) if b.expected().is_empty()) {
                    return Err(BuildError::EmptyBodies {
                        condition: condition.to_string(),
                    });
                }
                current
                    .get_or_insert_with(|| start(&clauses, pending_joint.take()))
                    .conditions
                    .push(condition);
            }
        }
    }

    if let Some(combinator) = pending_joint {
        return Err(BuildError::TrailingCombinator {
            combinator: combinator.keyword(),
        });
    }
    if let Some(pending) = current {
        clauses.push(pending.finish()?);
    }

    Expression::fold(clauses).ok_or(BuildError::EmptyExpression)
}

fn start(clauses: &[Clause], combinator: Option<Combinator>) -> Pending {
    let joint = match combinator {
        Some(combinator) => combinator.joint(),
        None if clauses.is_empty() => Joint::Leading,
        None => Joint::Implicit,
    };
    Pending::new(joint)
}
