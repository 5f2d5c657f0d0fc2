//! End-to-end matcher tests against a simulated pipeline.
//!
//! Every test builds a matcher subscribed to a [`Pipeline`] bus, sends
//! messages through the pipeline and checks `matches()` after each step.

mod common;

use common::{MockOracle, Pipeline, body_contains};
use serde_json::json;
use vigil::prelude::*;

// ============================================================================
// Counts and scopes
// ============================================================================

#[test]
fn test_when_done_simple() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_done(1)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "from(direct:foo).whenDone(1)");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "A");
    assert!(notify.matches());
}

#[test]
fn test_from_route() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from_route("foo")
        .when_done(1)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "fromRoute(foo).whenDone(1)");
    assert!(!notify.matches());

    pipeline.send_ok("direct:bar", "A");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "B");
    assert!(notify.matches());
}

#[test]
fn test_from_route_received() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from_route("foo")
        .when_received(1)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "fromRoute(foo).whenReceived(1)");

    pipeline.send_ok("direct:bar", "A");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "B");
    assert!(notify.matches());
}

#[test]
fn test_when_done_ignores_other_channels() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_done(5)
        .create()
        .unwrap();

    for body in ["A", "B", "C"] {
        pipeline.send_ok("direct:foo", body);
    }
    pipeline.send_ok("direct:bar", "D");
    pipeline.send_ok("direct:bar", "E");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "F");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "G");
    assert!(notify.matches());
}

#[test]
fn test_done_and() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_done(5)
        .and()
        .from("direct:bar")
        .when_done(7)
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "from(direct:foo).whenDone(5).and().from(direct:bar).whenDone(7)"
    );

    for i in 0..5 {
        pipeline.send_ok("direct:foo", &format!("foo {i}"));
    }
    for i in 0..6 {
        pipeline.send_ok("direct:bar", &format!("bar {i}"));
    }
    assert!(!notify.matches());

    pipeline.send_ok("direct:bar", "bar 6");
    assert!(notify.matches());
}

#[test]
fn test_from_route_and_not() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from_route("foo")
        .when_done(2)
        .and()
        .from_route("bar")
        .when_received(1)
        .not()
        .from_route("cake")
        .when_done(1)
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "fromRoute(foo).whenDone(2).and().fromRoute(bar).whenReceived(1).not().fromRoute(cake).whenDone(1)"
    );
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "A");
    pipeline.send_ok("direct:foo", "B");
    pipeline.send_ok("direct:bar", "C");
    assert!(notify.matches());

    pipeline.send_ok("direct:cake", "D");
    assert!(!notify.matches());
}

#[test]
fn test_or() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_done(5)
        .or()
        .from("direct:bar")
        .when_done(7)
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "from(direct:foo).whenDone(5).or().from(direct:bar).whenDone(7)"
    );

    for i in 0..4 {
        pipeline.send_ok("direct:foo", &i.to_string());
    }
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "4");
    assert!(notify.matches());
}

#[test]
fn test_not() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_done(2)
        .not()
        .from("direct:bar")
        .when_done(1)
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "from(direct:foo).whenDone(2).not().from(direct:bar).whenDone(1)"
    );

    pipeline.send_ok("direct:foo", "A");
    pipeline.send_ok("direct:foo", "B");
    assert!(notify.matches());

    pipeline.send_ok("direct:bar", "C");
    assert!(!notify.matches());
}

#[test]
fn test_or_failure() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_failed(1)
        .or()
        .when_done(10)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "whenFailed(1).or().whenDone(10)");

    pipeline.send_ok("direct:foo", "A");
    assert!(!notify.matches());

    assert!(pipeline.send("direct:fail", "B").is_ok());
    assert!(notify.matches());
}

#[test]
fn test_not_failure() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_done(2)
        .not()
        .when_failed(1)
        .create()
        .unwrap();

    pipeline.send_ok("direct:foo", "A");
    pipeline.send_ok("direct:bar", "B");
    assert!(notify.matches());

    pipeline.send_ok("direct:fail", "C");
    assert!(!notify.matches());
}

#[test]
fn test_filter() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .filter(body_contains("World"))
        .when_done(3)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "filter(body contains World).whenDone(3)");

    pipeline.send_ok("direct:foo", "Hello World");
    pipeline.send_ok("direct:bar", "Hi World");
    pipeline.send_ok("direct:foo", "Bye Camel");
    assert!(!notify.matches());

    // the finished body is "Bye World"
    pipeline.send_ok("direct:cake", "World");
    assert!(notify.matches());
}

#[test]
fn test_from_and_filter() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .filter(body_contains("World"))
        .when_done(3)
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "from(direct:foo).filter(body contains World).whenDone(3)"
    );

    pipeline.send_ok("direct:foo", "Hello World");
    pipeline.send_ok("direct:bar", "Hi World");
    pipeline.send_ok("direct:foo", "Bye Camel");
    pipeline.send_ok("direct:foo", "Hi World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hey World");
    assert!(notify.matches());
}

#[test]
fn test_completed_excludes_failures() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_completed(5)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "whenCompleted(5)");

    for body in ["A", "B", "C"] {
        pipeline.send_ok("direct:foo", body);
    }
    pipeline.send_ok("direct:fail", "D");
    pipeline.send_ok("direct:fail", "E");
    assert!(!notify.matches());

    pipeline.send_ok("direct:bar", "F");
    pipeline.send_ok("direct:bar", "G");
    assert!(notify.matches());
}

#[test]
fn test_exactly_done() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_exactly_done(5)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "whenExactlyDone(5)");

    for body in ["A", "B", "C", "D"] {
        pipeline.send_ok("direct:foo", body);
    }
    assert!(!notify.matches());

    pipeline.send_ok("direct:fail", "E");
    assert!(notify.matches());

    pipeline.send_ok("direct:bar", "F");
    assert!(!notify.matches());
}

#[test]
fn test_exactly_completed() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_exactly_completed(2)
        .create()
        .unwrap();

    pipeline.send_ok("direct:foo", "A");
    pipeline.send_ok("direct:fail", "B");
    pipeline.send_ok("direct:bar", "C");
    assert!(notify.matches());

    pipeline.send_ok("direct:fail", "D");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "E");
    assert!(!notify.matches());
}

#[test]
fn test_exactly_failed() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_exactly_failed(2)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "whenExactlyFailed(2)");

    pipeline.send_ok("direct:fail", "A");
    pipeline.send_ok("direct:foo", "B");
    assert!(!notify.matches());

    pipeline.send_ok("direct:fail", "C");
    assert!(notify.matches());

    pipeline.send_ok("direct:fail", "D");
    assert!(!notify.matches());
}

#[test]
fn test_or_binds_left_to_right() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_done(1)
        .or()
        .from("direct:bar")
        .when_done(1)
        .and()
        .from("direct:beer")
        .when_done(1)
        .create()
        .unwrap();

    // (foo OR bar) AND beer
    pipeline.send_ok("direct:foo", "A");
    assert!(!notify.matches());

    pipeline.send_ok("direct:beer", "B");
    assert!(notify.matches());
}

#[test]
fn test_leading_not() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .not()
        .from("direct:fail")
        .when_failed(1)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "not().from(direct:fail).whenFailed(1)");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "A");
    assert!(notify.matches());

    pipeline.send_ok("direct:fail", "B");
    assert!(!notify.matches());
}

#[test]
fn test_implicit_and_between_scoped_clauses() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_done(1)
        .from("direct:bar")
        .when_done(1)
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "from(direct:foo).whenDone(1).from(direct:bar).whenDone(1)"
    );

    pipeline.send_ok("direct:foo", "A");
    assert!(!notify.matches());

    pipeline.send_ok("direct:bar", "B");
    assert!(notify.matches());
}

// ============================================================================
// Wildcards
// ============================================================================

#[test]
fn test_wildcard_channel() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:b*")
        .when_done(2)
        .create()
        .unwrap();

    assert_eq!(notify.to_string(), "from(direct:b*).whenDone(2)");

    pipeline.send_ok("direct:foo", "A");
    pipeline.send_ok("direct:bar", "B");
    assert!(!notify.matches());

    pipeline.send_ok("direct:beer", "C");
    assert!(notify.matches());
}

#[test]
fn test_wildcard_route() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .from_route("*")
        .when_received(2)
        .create()
        .unwrap();

    // unrouted exchanges never match a route scope
    pipeline.send_ok("seda:unrouted", "A");
    pipeline.send_ok("direct:foo", "B");
    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "C");
    assert!(notify.matches());
}

#[test]
fn test_wildcards_disabled_compare_literally() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .with_config(MatcherConfig {
            wildcard_scopes: false,
            ..MatcherConfig::default()
        })
        .from("direct:*")
        .when_done(1)
        .create()
        .unwrap();

    pipeline.send_ok("direct:foo", "A");
    assert!(!notify.matches());

    pipeline.send_ok("direct:*", "B");
    assert!(notify.matches());
}

// ============================================================================
// Predicate conditions
// ============================================================================

#[test]
fn test_when_any_received_matches() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_any_received_matches(body_contains("Camel"))
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "whenAnyReceivedMatches(body contains Camel)"
    );
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hello World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Bye World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:bar", "Hello Camel");
    assert!(notify.matches());
}

#[test]
fn test_when_all_received_matches() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_all_received_matches(body_contains("Camel"))
        .create()
        .unwrap();

    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hello Camel");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "Bye Camel");
    assert!(notify.matches());

    pipeline.send_ok("direct:bar", "Hello World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:bar", "Hello Camel");
    assert!(!notify.matches());
}

#[test]
fn test_when_any_done_matches() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_any_done_matches(body_contains("Bye"))
        .create()
        .unwrap();

    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hi World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "Camel");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "Damn World");
    assert!(notify.matches());
}

#[test]
fn test_when_all_done_matches() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_all_done_matches(body_contains("Bye"))
        .create()
        .unwrap();

    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "Camel");
    assert!(notify.matches());

    pipeline.send_ok("direct:cake", "World");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "Hi World");
    assert!(!notify.matches());
}

// ============================================================================
// Body sequences
// ============================================================================

#[test]
fn test_when_bodies_received() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_bodies_received(["Hi World", "Hello World"])
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "whenBodiesReceived([Hi World, Hello World])"
    );
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hi World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hello World");
    assert!(notify.matches());

    // extra bodies keep a prefix match true
    pipeline.send_ok("direct:foo", "Bye World");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "Damn World");
    assert!(notify.matches());
}

#[test]
fn test_when_bodies_received_out_of_order() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_bodies_received(["Hi World", "Hello World"])
        .create()
        .unwrap();

    pipeline.send_ok("direct:foo", "Hello World");
    pipeline.send_ok("direct:foo", "Hi World");
    pipeline.send_ok("direct:foo", "Hello World");
    assert!(!notify.matches());
}

#[test]
fn test_when_bodies_done() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_bodies_done(["Bye World", "Bye Camel"])
        .create()
        .unwrap();

    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "Camel");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "Damn World");
    assert!(notify.matches());
}

#[test]
fn test_when_bodies_done_broken_by_failure() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_bodies_done(["Bye World", "Bye Camel"])
        .create()
        .unwrap();

    pipeline.send_ok("direct:cake", "World");
    // failed exchanges are done too, and this body breaks the sequence
    pipeline.send_ok("direct:fail", "Oops");
    pipeline.send_ok("direct:cake", "Camel");
    assert!(!notify.matches());
}

#[test]
fn test_when_exact_bodies_received() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_exact_bodies_received(["Hi World", "Hello World"])
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "whenExactBodiesReceived([Hi World, Hello World])"
    );

    pipeline.send_ok("direct:foo", "Hi World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hello World");
    assert!(notify.matches());

    // one body too many
    pipeline.send_ok("direct:foo", "Bye World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Damn World");
    assert!(!notify.matches());
}

#[test]
fn test_when_exact_bodies_done() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_exact_bodies_done(["Bye World", "Bye Camel"])
        .create()
        .unwrap();

    pipeline.send_ok("direct:cake", "World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "Camel");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "Damn World");
    assert!(!notify.matches());
}

#[test]
fn test_non_text_bodies() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_bodies_received([json!(1), json!({"id": 2})])
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        r#"whenBodiesReceived([1, {"id":2}])"#
    );

    let bus = pipeline.bus();
    bus.emit(&LifecycleEvent::received("direct:foo", json!(1)))
        .unwrap();
    bus.emit(&LifecycleEvent::received("direct:foo", json!({"id": 2})))
        .unwrap();
    assert!(notify.matches());
}

// ============================================================================
// Oracles
// ============================================================================

#[test]
fn test_when_done_satisfied_scoped() {
    let pipeline = Pipeline::new();
    let mock = MockOracle::expected_bodies_any_order(
        "mock:assert",
        &["Hello World", "Bye World", "Hi World"],
    );
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_done_satisfied(mock.clone())
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "from(direct:foo).whenDoneSatisfied(mock:assert)"
    );
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Bye World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hello World");
    assert!(!notify.matches());

    // out of scope, never forwarded to the oracle
    pipeline.send_ok("direct:bar", "Hi World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hi World");
    assert!(notify.matches());
    assert_eq!(mock.received(), vec!["Bye World", "Hello World", "Hi World"]);
}

#[test]
fn test_when_received_not_satisfied() {
    let pipeline = Pipeline::new();
    let mock = MockOracle::expected_count_with("mock:assert", 2, 1, "Camel");
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_received_not_satisfied(mock)
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "from(direct:foo).whenReceivedNotSatisfied(mock:assert)"
    );

    // false until the oracle has been asked
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Bye World");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "Hello Camel");
    assert!(!notify.matches());
}

#[test]
fn test_when_received_satisfied() {
    let pipeline = Pipeline::new();
    let mock = MockOracle::expected_count_with("mock:assert", 2, 1, "Camel");
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_received_satisfied(mock)
        .create()
        .unwrap();

    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Bye World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hello Camel");
    assert!(notify.matches());
}

#[test]
fn test_complex_and_with_oracle() {
    let pipeline = Pipeline::new();
    let mock = MockOracle::expected_bodies_any_order(
        "mock:assert",
        &["Hello World", "Bye World", "Hi World"],
    );
    let notify = NotifyBuilder::on(pipeline.source())
        .from("direct:foo")
        .when_received_satisfied(mock)
        .and()
        .from("direct:bar")
        .when_exactly_done(5)
        .when_any_received_matches(body_contains("Camel"))
        .create()
        .unwrap();

    assert_eq!(
        notify.to_string(),
        "from(direct:foo).whenReceivedSatisfied(mock:assert).and().from(direct:bar).whenExactlyDone(5).whenAnyReceivedMatches(body contains Camel)"
    );
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Bye World");
    pipeline.send_ok("direct:foo", "Hello World");
    pipeline.send_ok("direct:bar", "Hi World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hi World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:bar", "Hi Camel");
    assert!(!notify.matches());

    pipeline.send_ok("direct:bar", "A");
    pipeline.send_ok("direct:bar", "B");
    pipeline.send_ok("direct:bar", "C");
    assert!(notify.matches());
}

#[test]
fn test_when_done_satisfied() {
    let pipeline = Pipeline::new();
    let mock = MockOracle::expected_bodies("mock:assert", &["Bye World", "Bye Camel"]);
    let notify = NotifyBuilder::on(pipeline.source())
        .when_done_satisfied(mock)
        .create()
        .unwrap();

    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "Camel");
    assert!(notify.matches());

    // the expectation is already met
    pipeline.send_ok("direct:cake", "Damn");
    assert!(notify.matches());
}

#[test]
fn test_when_done_not_satisfied() {
    let pipeline = Pipeline::new();
    let mock = MockOracle::expected_bodies("mock:assert", &["Bye World", "Bye Camel"]);
    let notify = NotifyBuilder::on(pipeline.source())
        .when_done_not_satisfied(mock)
        .create()
        .unwrap();

    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "World");
    assert!(notify.matches());

    pipeline.send_ok("direct:cake", "Camel");
    assert!(!notify.matches());

    pipeline.send_ok("direct:cake", "Damn");
    assert!(!notify.matches());
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn test_reset() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_exactly_done(1)
        .create()
        .unwrap();

    pipeline.send_ok("direct:foo", "Hello World");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "Bye World");
    assert!(!notify.matches());

    notify.reset();
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hello World");
    assert!(notify.matches());

    pipeline.send_ok("direct:foo", "Bye World");
    assert!(!notify.matches());

    // four exchanges, two events each
    assert_eq!(notify.events_observed(), 8);
}

#[test]
fn test_reset_bodies_received() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_bodies_received(["Hello World", "Bye World"])
        .create()
        .unwrap();

    pipeline.send_ok("direct:foo", "Hello World");
    pipeline.send_ok("direct:foo", "Bye World");
    assert!(notify.matches());

    notify.reset();
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Hello World");
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "Bye World");
    assert!(notify.matches());
}

// ============================================================================
// Errors and subscription lifecycle
// ============================================================================

#[test]
fn test_predicate_error_reaches_emitter() {
    let pipeline = Pipeline::new();
    let exploding = predicate::try_from_fn("explodes", |_| Err("boom".into()));
    let notify = NotifyBuilder::on(pipeline.source())
        .when_any_received_matches(exploding)
        .or()
        .when_done(1)
        .create()
        .unwrap();

    let err = pipeline.send("direct:foo", "A").unwrap_err();
    assert!(matches!(err, EvalError::Predicate { .. }));
    assert_eq!(err.to_string(), "predicate 'explodes' failed: boom");

    // the finished event was still delivered
    assert!(notify.matches());
}

#[test]
fn test_filter_error_leaves_conditions_untouched() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .filter(predicate::try_from_fn("needs text", |m| {
            m.body_text().map(|_| true).ok_or_else(|| "not text".into())
        }))
        .when_received(1)
        .create()
        .unwrap();

    let result = pipeline
        .bus()
        .emit(&LifecycleEvent::received("direct:foo", json!(42)));
    assert!(matches!(result, Err(EvalError::Predicate { .. })));
    assert!(!notify.matches());

    pipeline.send_ok("direct:foo", "A");
    assert!(notify.matches());
}

#[test]
fn test_predicate_error_applies_nothing() {
    let pipeline = Pipeline::new();
    let text_only = predicate::try_from_fn("starts with Bye", |m| {
        m.body_text()
            .map(|b| b.starts_with("Bye"))
            .ok_or_else(|| "not text".into())
    });
    let notify = NotifyBuilder::on(pipeline.source())
        .when_exactly_done(1)
        .when_any_done_matches(text_only)
        .create()
        .unwrap();

    let result = pipeline
        .bus()
        .emit(&LifecycleEvent::completed("direct:foo", json!(5)));
    assert!(matches!(result, Err(EvalError::Predicate { .. })));
    assert!(!notify.matches());

    // the rejected event was not counted
    pipeline.send_ok("direct:cake", "World");
    assert!(notify.matches());
}

#[test]
fn test_predicate_error_skips_oracles() {
    let pipeline = Pipeline::new();
    let mock = MockOracle::expected_bodies_any_order("mock:done", &["Bye World"]);
    let text_only = predicate::try_from_fn("starts with Bye", |m| {
        m.body_text()
            .map(|b| b.starts_with("Bye"))
            .ok_or_else(|| "not text".into())
    });
    let notify = NotifyBuilder::on(pipeline.source())
        .when_done_satisfied(mock.clone())
        .and()
        .when_any_done_matches(text_only)
        .create()
        .unwrap();

    let result = pipeline
        .bus()
        .emit(&LifecycleEvent::completed("direct:foo", json!({"n": 1})));
    assert!(result.is_err());
    assert!(mock.received().is_empty());

    pipeline.send_ok("direct:cake", "World");
    assert_eq!(mock.received(), vec!["Bye World".to_string()]);
    assert!(notify.matches());
}

#[test]
fn test_oracle_error_reaches_emitter() {
    let pipeline = Pipeline::new();
    let mock = MockOracle::expected_bodies("mock:text", &["A"]);
    let _notify = NotifyBuilder::on(pipeline.source())
        .when_received_satisfied(mock)
        .create()
        .unwrap();

    let result = pipeline
        .bus()
        .emit(&LifecycleEvent::received("direct:foo", json!([1, 2])));
    let err = result.unwrap_err();
    assert!(matches!(err, EvalError::Oracle { .. }));
    assert!(err.to_string().starts_with("oracle 'mock:text' failed"));
}

#[test]
fn test_drop_unsubscribes() {
    let pipeline = Pipeline::new();
    let notify = NotifyBuilder::on(pipeline.source())
        .when_done(1)
        .create()
        .unwrap();
    let other = NotifyBuilder::on(pipeline.source())
        .when_received(1)
        .create()
        .unwrap();

    assert_eq!(pipeline.bus().listener_count(), 2);
    assert_ne!(notify.subscription_id(), other.subscription_id());

    drop(notify);
    assert_eq!(pipeline.bus().listener_count(), 1);

    pipeline.send_ok("direct:foo", "A");
    assert!(other.matches());
}

#[test]
fn test_build_error_does_not_subscribe() {
    let pipeline = Pipeline::new();
    let err = NotifyBuilder::on(pipeline.source())
        .when_done(1)
        .and()
        .create()
        .unwrap_err();

    assert_eq!(
        err,
        BuildError::TrailingCombinator {
            combinator: "and()"
        }
    );
    assert_eq!(pipeline.bus().listener_count(), 0);
}

#[test]
fn test_matchers_are_independent() {
    let pipeline = Pipeline::new();
    let first = NotifyBuilder::on(pipeline.source())
        .when_done(2)
        .create()
        .unwrap();

    pipeline.send_ok("direct:foo", "A");

    let second = NotifyBuilder::on(pipeline.source())
        .when_done(2)
        .create()
        .unwrap();

    pipeline.send_ok("direct:foo", "B");
    assert!(first.matches());
    assert!(!second.matches());

    first.reset();
    assert!(!first.matches());
    assert!(!second.matches());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_notify_applies_matcher_settings() {
    let pipeline = Pipeline::new();
    let mut config = VigilConfig::default();
    config.matcher.wildcard_scopes = false;

    let notify = config
        .notify(pipeline.source())
        .from_route("b*")
        .when_done(1)
        .create()
        .unwrap();

    pipeline.send_ok("direct:bar", "A");
    assert!(!notify.matches());
}

#[test]
fn test_config_notify_detached() {
    let config = VigilConfig::default();
    let notify = config
        .notify_detached()
        .from("direct:*")
        .when_received(1)
        .create()
        .unwrap();

    assert_eq!(notify.subscription_id(), None);

    notify
        .observe(&LifecycleEvent::received("direct:foo", "A").with_route("foo"))
        .unwrap();
    assert!(notify.matches());
}
