//! Event fan-out for a matcher.
//!
//! The [`DispatchTable`] is built once when a matcher is created. It maps an
//! incoming lifecycle event to the condition groups that could possibly be
//! affected by it, so a matcher with many scoped clauses does not evaluate
//! every filter for every event.
//!
//! # Indexing
//!
//! Groups are bucketed first by the event kinds they react to and then by
//! scope:
//!
//! 1. Groups with an exact `from(..)` filter are indexed by channel
//! 2. Otherwise, groups with an exact `fromRoute(..)` filter are indexed by route
//! 3. Everything else (wildcards, predicate filters, unscoped groups) is
//!    checked for every event of the right kind
//!
//! Indexing only narrows the candidates. Every candidate still applies all
//! of its filters in [`ConditionGroup::observe`](crate::ConditionGroup::observe).

use std::collections::HashMap;

use crate::condition::Interest;
use crate::expression::{Expression, GroupId};
use crate::scope::ScopeFilter;
use vigil_core::{EventKind, LifecycleEvent};

#[derive(Debug, Default, Clone)]
struct Buckets {
    by_channel: HashMap<String, Vec<GroupId>>,
    by_route: HashMap<String, Vec<GroupId>>,
    unindexed: Vec<GroupId>,
}

impl Buckets {
    fn insert(&mut self, key: Option<IndexKey<'_>>, id: GroupId) {
        match key {
            Some(IndexKey::Channel(channel)) => self
                .by_channel
                .entry(channel.to_string())
                .or_default()
                .push(id),
            Some(IndexKey::Route(route)) => {
                self.by_route.entry(route.to_string()).or_default().push(id)
            }
            None => self.unindexed.push(id),
        }
    }

    fn collect(&self, event: &LifecycleEvent, out: &mut Vec<GroupId>) {
        if let Some(ids) = self.by_channel.get(event.channel()) {
            out.extend_from_slice(ids);
        }
        if let Some(ids) = event.route_id().and_then(|route| self.by_route.get(route)) {
            out.extend_from_slice(ids);
        }
        out.extend_from_slice(&self.unindexed);
    }

    fn len(&self) -> usize {
        self.by_channel.values().map(Vec::len).sum::<usize>()
            + self.by_route.values().map(Vec::len).sum::<usize>()
            + self.unindexed.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum IndexKey<'a> {
    Channel(&'a str),
    Route(&'a str),
}

fn index_key(filters: &[ScopeFilter]) -> Option<IndexKey<'_>> {
    let channel = filters.iter().find_map(|f| match f {
        ScopeFilter::Channel(pattern) => pattern.exact().map(IndexKey::Channel),
        _ => None,
    });
    channel.or_else(|| {
        filters.iter().find_map(|f| match f {
            ScopeFilter::Route(pattern) => pattern.exact().map(IndexKey::Route),
            _ => None,
        })
    })
}

/// Immutable lookup from events to candidate condition groups.
#[derive(Debug, Default, Clone)]
pub struct DispatchTable {
    received: Buckets,
    finished: Buckets,
}

impl DispatchTable {
    /// Builds the table for an expression.
    pub fn build(expression: &Expression) -> Self {
        let mut table = Self::default();

        for (id, group) in expression.group_ids().zip(expression.groups()) {
            let key = index_key(group.filters());
            let Interest { received, finished } = group.interest();
            if received {
                table.received.insert(key, id);
            }
            if finished {
                table.finished.insert(key, id);
            }
        }

        table
    }

    /// Returns the groups that may be affected by `event`, in ascending
    /// [`GroupId`] order and without duplicates.
    pub fn targets(&self, event: &LifecycleEvent) -> Vec<GroupId> {
        let buckets = match event.kind() {
            EventKind::Received => &self.received,
            EventKind::Finished(_) => &self.finished,
        };

        let mut out = Vec::new();
        buckets.collect(event, &mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Number of (kind, group) registrations.
    pub fn registration_count(&self) -> usize {
        self.received.len() + self.finished.len()
    }
}
