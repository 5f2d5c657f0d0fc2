use std::fmt;

use super::Interest;
use vigil_core::{EventKind, LifecycleEvent};

/// The kind of event a [`CountCondition`] counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountKind {
    /// Exchanges entering a route.
    Received,
    /// Exchanges finishing with any outcome.
    Done,
    /// Exchanges finishing successfully.
    Completed,
    /// Exchanges finishing with a failure.
    Failed,
}

impl CountKind {
    /// Returns `true` if an event of `kind` increments the count.
    pub fn counts(self, kind: EventKind) -> bool {
        match self {
            Self::Received => kind.is_received(),
            Self::Done => kind.is_finished(),
            Self::Completed => kind.is_completed(),
            Self::Failed => kind.is_failed(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::Done => "Done",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

/// How the observed count is compared with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountMode {
    /// True once `count >= target`. Stays true as more events arrive.
    AtLeast,
    /// True only while `count == target`. Turns false on overshoot.
    Exactly,
}

/// Counts events of one kind and compares against a target.
#[derive(Debug, Clone)]
pub struct CountCondition {
    kind: CountKind,
    mode: CountMode,
    target: usize,
    count: usize,
}

impl CountCondition {
    /// Creates a count condition. A target of zero is satisfied immediately
    /// (or, in exact mode, until the first matching event).
    pub fn new(kind: CountKind, mode: CountMode, target: usize) -> Self {
        Self {
            kind,
            mode,
            target,
            count: 0,
        }
    }

    pub(crate) fn observe(&mut self, event: &LifecycleEvent) {
        if self.kind.counts(event.kind()) {
            self.count = self.count.saturating_add(1);
        }
    }

    /// Returns the current value.
    pub fn value(&self) -> bool {
        match self.mode {
            CountMode::AtLeast => self.count >= self.target,
            CountMode::Exactly => self.count == self.target,
        }
    }

    /// Number of matching events observed since creation or the last reset.
    pub fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn reset(&mut self) {
        self.count = 0;
    }

    pub(crate) fn interest(&self) -> Interest {
        match self.kind {
            CountKind::Received => Interest::RECEIVED,
            _ => Interest::FINISHED,
        }
    }
}

impl fmt::Display for CountCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exactly = match self.mode {
            CountMode::AtLeast => "",
            CountMode::Exactly => "Exactly",
        };
        write!(f, "when{exactly}{}({})", self.kind.label(), self.target)
    }
}
