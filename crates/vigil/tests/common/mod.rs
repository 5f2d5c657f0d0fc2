//! Shared utilities for matcher integration tests.
//!
//! [`Pipeline`] simulates a small routing engine on top of an [`EventBus`]:
//!
//! | channel       | route | behavior                           |
//! |---------------|-------|------------------------------------|
//! | `direct:foo`  | foo   | passes the body through            |
//! | `direct:bar`  | bar   | passes the body through            |
//! | `direct:fail` | fail  | always fails                       |
//! | `direct:cake` | cake  | prepends `Bye ` to the body        |
//! | `direct:beer` | beer  | passes the body through            |
//!
//! Any other channel is received and completed without a route.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use vigil::prelude::*;

/// An in-process pipeline that reports lifecycle events on a bus.
pub struct Pipeline {
    bus: Arc<EventBus>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            bus: Arc::new(EventBus::new()),
        }
    }

    /// The bus as an event source for `NotifyBuilder::on`.
    pub fn source(&self) -> Arc<dyn EventSource> {
        self.bus.clone()
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Sends a body into a channel, emitting `received` and then a finished
    /// event, and returns the first delivery error.
    pub fn send(&self, channel: &str, body: &str) -> EvalResult<()> {
        let route = route_of(channel);

        let mut received = LifecycleEvent::received(channel, body);
        if let Some(route) = route {
            received = received.with_route(route);
        }
        let received_result = self.bus.emit(&received);

        let mut finished = match route {
            Some("fail") => LifecycleEvent::failed(channel, body),
            Some("cake") => LifecycleEvent::completed(channel, format!("Bye {body}")),
            _ => LifecycleEvent::completed(channel, body),
        };
        if let Some(route) = route {
            finished = finished.with_route(route);
        }
        let finished_result = self.bus.emit(&finished);

        received_result.and(finished_result)
    }

    /// Sends a body and panics on delivery errors.
    pub fn send_ok(&self, channel: &str, body: &str) {
        self.send(channel, body)
            .unwrap_or_else(|e| panic!("delivery to {channel} failed: {e}"));
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn route_of(channel: &str) -> Option<&'static str> {
    match channel {
        "direct:foo" => Some("foo"),
        "direct:bar" => Some("bar"),
        "direct:fail" => Some("fail"),
        "direct:cake" => Some("cake"),
        "direct:beer" => Some("beer"),
        _ => None,
    }
}

/// Predicate: the body is text containing `needle`.
pub fn body_contains(needle: &'static str) -> FnPredicate {
    predicate::from_fn(format!("body contains {needle}"), move |msg| {
        msg.body_text().is_some_and(|b| b.contains(needle))
    })
}

// ============================================================================
// Mock oracle
// ============================================================================

type Expectation = dyn Fn(&[String]) -> bool + Send + Sync;

/// An assertion sink that records bodies and checks them against an
/// expectation.
pub struct MockOracle {
    name: String,
    received: Mutex<Vec<String>>,
    expectation: Box<Expectation>,
}

impl MockOracle {
    fn with_expectation<F>(name: &str, expectation: F) -> Arc<Self>
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.to_string(),
            received: Mutex::new(Vec::new()),
            expectation: Box::new(expectation),
        })
    }

    /// Satisfied once the first recorded bodies equal `expected`, in order.
    pub fn expected_bodies(name: &str, expected: &[&str]) -> Arc<Self> {
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        Self::with_expectation(name, move |received| {
            received.len() >= expected.len() && received[..expected.len()] == expected[..]
        })
    }

    /// Satisfied once every body in `expected` has been recorded.
    pub fn expected_bodies_any_order(name: &str, expected: &[&str]) -> Arc<Self> {
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        Self::with_expectation(name, move |received| {
            expected.iter().all(|e| received.contains(e))
        })
    }

    /// Satisfied when exactly `count` bodies were recorded and the body at
    /// `index` contains `needle`.
    pub fn expected_count_with(
        name: &str,
        count: usize,
        index: usize,
        needle: &'static str,
    ) -> Arc<Self> {
        Self::with_expectation(name, move |received| {
            received.len() == count && received.get(index).is_some_and(|b| b.contains(needle))
        })
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }
}

impl Oracle for MockOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn record(&self, message: &Message) -> Result<(), BoxError> {
        let body = message
            .body_text()
            .map(str::to_string)
            .ok_or_else(|| format!("{} only accepts text bodies", self.name))?;
        self.received.lock().push(body);
        Ok(())
    }

    fn is_satisfied(&self) -> Result<bool, BoxError> {
        Ok((self.expectation)(&self.received.lock()))
    }
}
