//! Conditions: the leaves of a matcher expression.
//!
//! Each condition is a small state machine that is fed the lifecycle events
//! its group lets through and exposes a boolean value. Conditions come in
//! four families:
//!
//! - [`CountCondition`]: counts events of a kind (`whenDone(5)`, `whenExactlyFailed(1)`)
//! - [`MatchesCondition`]: applies a predicate to each message (`whenAllReceivedMatches(..)`)
//! - [`BodiesCondition`]: compares message bodies against an expected sequence
//! - [`OracleCondition`]: forwards messages to an external [`Oracle`](vigil_core::Oracle)
//!
//! Every condition also reports its [`Interest`], the event kinds it reacts
//! to, so the dispatch table can skip groups that would ignore an event.

mod bodies;
mod count;
mod matches;
mod oracle;

use std::fmt;

pub use bodies::BodiesCondition;
pub use count::{CountCondition, CountKind, CountMode};
pub use matches::{MatchesCondition, Quantifier};
pub use oracle::{Expectation, OracleCondition};

use vigil_core::{EvalResult, EventKind, LifecycleEvent};

/// Which half of an exchange's lifecycle a condition watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Exchanges entering a route.
    Received,
    /// Exchanges finishing, whether completed or failed.
    Done,
}

impl Phase {
    /// Returns `true` if events of `kind` belong to this phase.
    pub fn applies(self, kind: EventKind) -> bool {
        match self {
            Self::Received => kind.is_received(),
            Self::Done => kind.is_finished(),
        }
    }

    /// Name fragment used in canonical strings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::Done => "Done",
        }
    }

    fn interest(self) -> Interest {
        match self {
            Self::Received => Interest::RECEIVED,
            Self::Done => Interest::FINISHED,
        }
    }
}

/// The set of event kinds something reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interest {
    /// Reacts to received events.
    pub received: bool,
    /// Reacts to completed and failed events.
    pub finished: bool,
}

impl Interest {
    /// Received events only.
    pub const RECEIVED: Self = Self {
        received: true,
        finished: false,
    };

    /// Completed and failed events only.
    pub const FINISHED: Self = Self {
        received: false,
        finished: true,
    };

    /// Returns the union of two interests.
    pub fn union(self, other: Self) -> Self {
        Self {
            received: self.received || other.received,
            finished: self.finished || other.finished,
        }
    }

    /// Returns `true` if events of `kind` are of interest.
    pub fn accepts(self, kind: EventKind) -> bool {
        match kind {
            EventKind::Received => self.received,
            EventKind::Finished(_) => self.finished,
        }
    }
}

/// A single boolean test over the events a group observes.
pub enum Condition {
    /// Event counting.
    Count(CountCondition),
    /// Per-message predicate evaluation.
    Matches(MatchesCondition),
    /// Expected body sequence.
    Bodies(BodiesCondition),
    /// External oracle.
    Oracle(OracleCondition),
}

impl Condition {
    /// Feeds an in-scope event to the condition.
    ///
    /// Events of a kind the condition does not watch are ignored.
    pub fn observe(&mut self, event: &LifecycleEvent) -> EvalResult<()> {
        match self {
            Self::Count(c) => {
                c.observe(event);
                Ok(())
            }
            Self::Matches(c) => c.observe(event),
            Self::Bodies(c) => {
                c.observe(event);
                Ok(())
            }
            Self::Oracle(c) => c.observe(event),
        }
    }

    /// Runs the condition's predicate, if it has one, without changing state.
    pub(crate) fn evaluate(&self, event: &LifecycleEvent) -> EvalResult<Option<bool>> {
        match self {
            Self::Matches(c) => c.evaluate(event),
            _ => Ok(None),
        }
    }

    /// Records the message with the condition's oracle, if it has one, and
    /// returns the oracle's answer.
    pub(crate) fn consult(&self, event: &LifecycleEvent) -> EvalResult<Option<bool>> {
        match self {
            Self::Oracle(c) => c.consult(event),
            _ => Ok(None),
        }
    }

    /// Updates state from an event and the outcome of `evaluate` or
    /// `consult`. Cannot fail.
    pub(crate) fn apply(&mut self, event: &LifecycleEvent, input: Option<bool>) {
        match (self, input) {
            (Self::Count(c), _) => c.observe(event),
            (Self::Bodies(c), _) => c.observe(event),
            (Self::Matches(c), Some(ok)) => c.record(ok),
            (Self::Oracle(c), Some(satisfied)) => c.settle(satisfied),
            (Self::Matches(_) | Self::Oracle(_), None) => {}
        }
    }

    /// Returns the current value.
    pub fn value(&self) -> bool {
        match self {
            Self::Count(c) => c.value(),
            Self::Matches(c) => c.value(),
            Self::Bodies(c) => c.value(),
            Self::Oracle(c) => c.value(),
        }
    }

    /// Returns the condition to its initial state.
    pub fn reset(&mut self) {
        match self {
            Self::Count(c) => c.reset(),
            Self::Matches(c) => c.reset(),
            Self::Bodies(c) => c.reset(),
            Self::Oracle(c) => c.reset(),
        }
    }

    /// Returns the event kinds this condition reacts to.
    pub fn interest(&self) -> Interest {
        match self {
            Self::Count(c) => c.interest(),
            Self::Matches(c) => c.phase().interest(),
            Self::Bodies(c) => c.phase().interest(),
            Self::Oracle(c) => c.phase().interest(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(c) => fmt::Display::fmt(c, f),
            Self::Matches(c) => fmt::Display::fmt(c, f),
            Self::Bodies(c) => fmt::Display::fmt(c, f),
            Self::Oracle(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("form", &self.to_string())
            .field("value", &self.value())
            .finish()
    }
}

impl From<CountCondition> for Condition {
    fn from(c: CountCondition) -> Self {
        Self::Count(c)
    }
}

impl From<MatchesCondition> for Condition {
    fn from(c: MatchesCondition) -> Self {
        Self::Matches(c)
    }
}

impl From<BodiesCondition> for Condition {
    fn from(c: BodiesCondition) -> Self {
        Self::Bodies(c)
    }
}

impl From<OracleCondition> for Condition {
    fn from(c: OracleCondition) -> Self {
        Self::Oracle(c)
    }
}
