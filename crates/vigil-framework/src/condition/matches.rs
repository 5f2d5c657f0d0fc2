use std::fmt;

use super::Phase;
use vigil_core::{BoxedPredicate, EvalError, EvalResult, LifecycleEvent};

/// Whether one or every observed message must satisfy the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// At least one message matched.
    Any,
    /// At least one message was seen and none failed to match.
    All,
}

impl Quantifier {
    fn label(self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::All => "All",
        }
    }
}

/// Applies a predicate to every message of its phase.
#[derive(Clone)]
pub struct MatchesCondition {
    phase: Phase,
    quantifier: Quantifier,
    predicate: BoxedPredicate,
    seen: usize,
    matched: bool,
    violated: bool,
}

impl MatchesCondition {
    /// Creates a predicate condition.
    pub fn new(phase: Phase, quantifier: Quantifier, predicate: BoxedPredicate) -> Self {
        Self {
            phase,
            quantifier,
            predicate,
            seen: 0,
            matched: false,
            violated: false,
        }
    }

    /// The phase this condition watches.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn observe(&mut self, event: &LifecycleEvent) -> EvalResult<()> {
        if let Some(ok) = self.evaluate(event)? {
            self.record(ok);
        }
        Ok(())
    }

    /// Runs the predicate without touching state.
    ///
    /// Returns `None` for events outside this condition's phase.
    pub(crate) fn evaluate(&self, event: &LifecycleEvent) -> EvalResult<Option<bool>> {
        if !self.phase.applies(event.kind()) {
            return Ok(None);
        }
        self.predicate
            .matches(event.message())
            .map(Some)
            .map_err(|source| EvalError::predicate(self.predicate.to_string(), source))
    }

    pub(crate) fn record(&mut self, ok: bool) {
        self.seen += 1;
        if ok {
            self.matched = true;
        } else {
            self.violated = true;
        }
    }

    /// Returns the current value.
    pub fn value(&self) -> bool {
        match self.quantifier {
            Quantifier::Any => self.matched,
            Quantifier::All => self.seen > 0 && !self.violated,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.seen = 0;
        self.matched = false;
        self.violated = false;
    }
}

impl fmt::Display for MatchesCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "when{}{}Matches({})",
            self.quantifier.label(),
            self.phase.label(),
            self.predicate
        )
    }
}
