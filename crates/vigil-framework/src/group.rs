//! Condition groups: scope filters plus the conditions they guard.

use std::fmt;

use crate::condition::{Condition, Interest};
use crate::scope::ScopeFilter;
use vigil_core::{EvalResult, LifecycleEvent};

/// Outcomes of an in-scope event, one per condition, computed before any
/// condition state changes.
#[derive(Debug)]
pub(crate) struct Delivery {
    inputs: Vec<Option<bool>>,
}

/// A conjunction of conditions evaluated over the events that pass every
/// scope filter of the group.
///
/// A group with no filters observes every event. The builder guarantees at
/// least one condition.
#[derive(Debug)]
pub struct ConditionGroup {
    filters: Vec<ScopeFilter>,
    conditions: Vec<Condition>,
    interest: Interest,
}

impl ConditionGroup {
    /// Creates a group.
    pub fn new(filters: Vec<ScopeFilter>, conditions: Vec<Condition>) -> Self {
        let interest = conditions
            .iter()
            .fold(Interest::default(), |acc, c| acc.union(c.interest()));
        Self {
            filters,
            conditions,
            interest,
        }
    }

    /// Feeds an event to the group.
    ///
    /// Returns `Ok(true)` if the event was in scope and reached the conditions.
    /// On error no condition changes.
    pub fn observe(&mut self, event: &LifecycleEvent) -> EvalResult<bool> {
        let Some(mut delivery) = self.evaluate(event)? else {
            return Ok(false);
        };
        self.consult(event, &mut delivery)?;
        self.apply(event, delivery);
        Ok(true)
    }

    /// Checks scope and runs every predicate, leaving state untouched.
    ///
    /// Returns `None` if the event is out of scope.
    pub(crate) fn evaluate(&self, event: &LifecycleEvent) -> EvalResult<Option<Delivery>> {
        if !self.interest.accepts(event.kind()) {
            return Ok(None);
        }
        for filter in &self.filters {
            if !filter.accepts(event)? {
                return Ok(None);
            }
        }
        let inputs = self
            .conditions
            .iter()
            .map(|c| c.evaluate(event))
            .collect::<EvalResult<Vec<_>>>()?;
        Ok(Some(Delivery { inputs }))
    }

    /// Hands the event to every oracle of the group.
    pub(crate) fn consult(
        &self,
        event: &LifecycleEvent,
        delivery: &mut Delivery,
    ) -> EvalResult<()> {
        for (condition, input) in self.conditions.iter().zip(&mut delivery.inputs) {
            if let Some(answer) = condition.consult(event)? {
                *input = Some(answer);
            }
        }
        Ok(())
    }

    /// Commits a delivery to the conditions.
    pub(crate) fn apply(&mut self, event: &LifecycleEvent, delivery: Delivery) {
        for (condition, input) in self.conditions.iter_mut().zip(delivery.inputs) {
            condition.apply(event, input);
        }
    }

    /// Returns `true` if every condition holds.
    pub fn value(&self) -> bool {
        self.conditions.iter().all(Condition::value)
    }

    /// Resets every condition.
    pub fn reset(&mut self) {
        self.conditions.iter_mut().for_each(Condition::reset);
    }

    /// The scope filters of this group.
    pub fn filters(&self) -> &[ScopeFilter] {
        &self.filters
    }

    /// The conditions of this group.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The event kinds at least one condition reacts to.
    pub fn interest(&self) -> Interest {
        self.interest
    }
}

impl fmt::Display for ConditionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters = self.filters.iter().map(|s| s as &dyn fmt::Display);
        let conditions = self.conditions.iter().map(|c| c as &dyn fmt::Display);
        for (i, part) in filters.chain(conditions).enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}
