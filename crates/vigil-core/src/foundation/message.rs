//! Message payloads carried by lifecycle events.
//!
//! A [`Message`] is the snapshot of an exchange's content at the moment a
//! lifecycle event was emitted: the body plus a flat header map. Bodies are
//! dynamic [`serde_json::Value`]s so that predicates, expected-body lists and
//! oracles can all compare them without knowing the pipeline's payload types.
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_core::Message;
//!
//! let msg = Message::new("Hello World").with_header("priority", 3);
//! assert_eq!(msg.body_text(), Some("Hello World"));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Message
// ============================================================================

/// The content of an exchange as observed by a lifecycle event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Message {
    /// The message body.
    body: Value,
    /// Message headers, ordered by name.
    #[serde(default)]
    headers: BTreeMap<String, Value>,
}

impl Message {
    /// Creates a message with the given body and no headers.
    pub fn new(body: impl Into<Value>) -> Self {
        Self {
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Adds a header (builder pattern).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the body as text if it is a JSON string.
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_str()
    }

    /// Replaces the body, keeping headers.
    pub fn set_body(&mut self, body: impl Into<Value>) {
        self.body = body.into();
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers.get(name)
    }

    /// Returns all headers.
    pub fn headers(&self) -> &BTreeMap<String, Value> {
        &self.headers
    }
}

impl From<&str> for Message {
    fn from(body: &str) -> Self {
        Self::new(body)
    }
}

impl From<String> for Message {
    fn from(body: String) -> Self {
        Self::new(body)
    }
}

impl From<Value> for Message {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}

// ============================================================================
// Body Display
// ============================================================================

/// Renders a body value for canonical expression strings and logs.
///
/// Strings are written bare (`Hello World`, not `"Hello World"`); every other
/// value uses its JSON form.
#[derive(Debug, Clone, Copy)]
pub struct BodyDisplay<'a>(pub &'a Value);

impl fmt::Display for BodyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_accessors() {
        let msg = Message::new("Hi World").with_header("id", 7);
        assert_eq!(msg.body_text(), Some("Hi World"));
        assert_eq!(msg.header("id"), Some(&json!(7)));
        assert!(msg.header("missing").is_none());
    }

    #[test]
    fn test_set_body_keeps_headers() {
        let mut msg = Message::new("World").with_header("k", "v");
        msg.set_body("Bye World");
        assert_eq!(msg.body(), &json!("Bye World"));
        assert_eq!(msg.headers().len(), 1);
    }

    #[test]
    fn test_body_display_strings_are_bare() {
        assert_eq!(BodyDisplay(&json!("Hello")).to_string(), "Hello");
        assert_eq!(BodyDisplay(&json!(42)).to_string(), "42");
        assert_eq!(BodyDisplay(&json!({"a": 1})).to_string(), r#"{"a":1}"#);
    }
}
