use std::fmt;

use super::Phase;
use vigil_core::{BoxedOracle, EvalError, EvalResult, LifecycleEvent};

/// Which oracle answer makes the condition true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expectation {
    /// The oracle reports satisfied.
    Satisfied,
    /// The oracle reports not satisfied.
    NotSatisfied,
}

impl Expectation {
    fn label(self) -> &'static str {
        match self {
            Self::Satisfied => "Satisfied",
            Self::NotSatisfied => "NotSatisfied",
        }
    }
}

/// Forwards in-scope messages to an oracle and caches its answer.
///
/// The value is `false` until the oracle has been queried at least once,
/// for both expectations.
#[derive(Clone)]
pub struct OracleCondition {
    phase: Phase,
    expectation: Expectation,
    oracle: BoxedOracle,
    answer: Option<bool>,
}

impl OracleCondition {
    /// Creates an oracle condition.
    pub fn new(phase: Phase, expectation: Expectation, oracle: BoxedOracle) -> Self {
        Self {
            phase,
            expectation,
            oracle,
            answer: None,
        }
    }

    /// The phase this condition watches.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn observe(&mut self, event: &LifecycleEvent) -> EvalResult<()> {
        if let Some(satisfied) = self.consult(event)? {
            self.settle(satisfied);
        }
        Ok(())
    }

    /// Records the message with the oracle and asks for its answer.
    ///
    /// The oracle keeps the recorded message even if the query then fails.
    /// Returns `None` for events outside this condition's phase.
    pub(crate) fn consult(&self, event: &LifecycleEvent) -> EvalResult<Option<bool>> {
        if !self.phase.applies(event.kind()) {
            return Ok(None);
        }

        let name = self.oracle.name();
        self.oracle
            .record(event.message())
            .map_err(|source| EvalError::oracle(name, source))?;

        match self.phase {
            Phase::Received => self.oracle.is_satisfied(),
            Phase::Done => self.oracle.is_satisfied_after_completion(),
        }
        .map(Some)
        .map_err(|source| EvalError::oracle(name, source))
    }

    pub(crate) fn settle(&mut self, satisfied: bool) {
        self.answer = Some(satisfied);
    }

    /// Returns the current value.
    pub fn value(&self) -> bool {
        match (self.answer, self.expectation) {
            (None, _) => false,
            (Some(satisfied), Expectation::Satisfied) => satisfied,
            (Some(satisfied), Expectation::NotSatisfied) => !satisfied,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.answer = None;
    }
}

impl fmt::Display for OracleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "when{}{}({})",
            self.phase.label(),
            self.expectation.label(),
            self.oracle.name()
        )
    }
}
