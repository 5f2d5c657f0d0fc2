use std::fmt;

use serde_json::Value;

use super::Phase;
use vigil_core::{BodyDisplay, LifecycleEvent};

/// Compares the bodies of observed messages with an expected sequence.
///
/// In prefix mode the first `n` bodies must equal the expected ones in
/// order; later bodies are ignored. In exact mode the observed sequence
/// must equal the expected one, so an extra message turns it false. A
/// mismatch is permanent until reset.
#[derive(Debug, Clone)]
pub struct BodiesCondition {
    phase: Phase,
    exact: bool,
    expected: Vec<Value>,
    observed: usize,
    deviated: bool,
}

impl BodiesCondition {
    /// Creates a body-sequence condition.
    pub fn new(phase: Phase, exact: bool, expected: Vec<Value>) -> Self {
        Self {
            phase,
            exact,
            expected,
            observed: 0,
            deviated: false,
        }
    }

    /// The phase this condition watches.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The expected bodies, in order.
    pub fn expected(&self) -> &[Value] {
        &self.expected
    }

    pub(crate) fn observe(&mut self, event: &LifecycleEvent) {
        if !self.phase.applies(event.kind()) {
            return;
        }

        let position = self.observed;
        self.observed = self.observed.saturating_add(1);

        if self
            .expected
            .get(position)
            .is_some_and(|expected| expected != event.message().body())
        {
            self.deviated = true;
        }
    }

    /// Returns the current value.
    pub fn value(&self) -> bool {
        if self.deviated {
            return false;
        }
        if self.exact {
            self.observed == self.expected.len()
        } else {
            self.observed >= self.expected.len()
        }
    }

    pub(crate) fn reset(&mut self) {
        self.observed = 0;
        self.deviated = false;
    }
}

impl fmt::Display for BodiesCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exact = if self.exact { "Exact" } else { "" };
        write!(f, "when{exact}Bodies{}([", self.phase.label())?;
        for (i, body) in self.expected.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", BodyDisplay(body))?;
        }
        f.write_str("])")
    }
}
