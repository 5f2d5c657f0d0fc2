//! Lifecycle events emitted by the routing pipeline.
//!
//! Every exchange produces at least two events: one when it is **received**
//! on a channel and one when it **finishes**, either successfully or with a
//! failure. Matchers never see the pipeline itself, only this stream.
//!
//! ```text
//! send("direct:foo", "A")
//!   ├─▶ LifecycleEvent { channel: "direct:foo", route: "foo", kind: Received,          body: "A" }
//!   └─▶ LifecycleEvent { channel: "direct:foo", route: "foo", kind: Finished(Success), body: "A" }
//! ```

use std::fmt;

use super::message::Message;

// ============================================================================
// Event Kind
// ============================================================================

/// How a finished exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The exchange completed successfully.
    Success,
    /// The exchange finished with a failure.
    Failure,
}

/// Classification of a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A message was received on a channel and an exchange was created.
    Received,
    /// An exchange finished with the given outcome.
    Finished(Outcome),
}

impl EventKind {
    /// Returns true for [`EventKind::Received`].
    pub fn is_received(self) -> bool {
        matches!(self, Self::Received)
    }

    /// Returns true for any [`EventKind::Finished`] event.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// Returns true for a successful finish.
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Finished(Outcome::Success))
    }

    /// Returns true for a failed finish.
    pub fn is_failed(self) -> bool {
        matches!(self, Self::Finished(Outcome::Failure))
    }

    /// Returns the lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Finished(Outcome::Success) => "completed",
            Self::Finished(Outcome::Failure) => "failed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Lifecycle Event
// ============================================================================

/// A single lifecycle notification from the pipeline.
///
/// The `route_id` is optional because a message may be received on a
/// channel that no route consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEvent {
    channel: String,
    route_id: Option<String>,
    kind: EventKind,
    message: Message,
}

impl LifecycleEvent {
    /// Creates an event of the given kind.
    pub fn new(channel: impl Into<String>, kind: EventKind, message: impl Into<Message>) -> Self {
        Self {
            channel: channel.into(),
            route_id: None,
            kind,
            message: message.into(),
        }
    }

    /// Creates a [`EventKind::Received`] event.
    pub fn received(channel: impl Into<String>, message: impl Into<Message>) -> Self {
        Self::new(channel, EventKind::Received, message)
    }

    /// Creates a successful [`EventKind::Finished`] event.
    pub fn completed(channel: impl Into<String>, message: impl Into<Message>) -> Self {
        Self::new(channel, EventKind::Finished(Outcome::Success), message)
    }

    /// Creates a failed [`EventKind::Finished`] event.
    pub fn failed(channel: impl Into<String>, message: impl Into<Message>) -> Self {
        Self::new(channel, EventKind::Finished(Outcome::Failure), message)
    }

    /// Sets the route that processed the exchange (builder pattern).
    pub fn with_route(mut self, route_id: impl Into<String>) -> Self {
        self.route_id = Some(route_id.into());
        self
    }

    /// Returns the channel the exchange entered through.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns the route id, if the exchange was routed.
    pub fn route_id(&self) -> Option<&str> {
        self.route_id.as_deref()
    }

    /// Returns the event kind.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns the message snapshot.
    pub fn message(&self) -> &Message {
        &self.message
    }
}
