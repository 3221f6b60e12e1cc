//! The immutable [`Event`] value and its submission context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Submission provenance attached to every event.
///
/// The context is opaque to listeners: the bus and the runtime never
/// inspect it beyond equality. It exists so that a chain of events
/// triggered by one external stimulus can be correlated in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventContext {
    /// Unique id of this submission.
    pub id: Uuid,
}

impl EventContext {
    /// Creates a fresh context with a random id.
    #[must_use]
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable notification value.
///
/// Events are created once and never mutated; equality is structural
/// over all four fields. The data map is unordered.
///
/// # Example
///
/// ```
/// use patchbay_event::Event;
/// use serde_json::{json, Map};
///
/// let mut data = Map::new();
/// data.insert("temperature".into(), json!(21.5));
///
/// let event = Event::new("state_changed", data);
/// assert_eq!(event.event_type, "state_changed");
/// assert_eq!(event.data["temperature"], json!(21.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// What kind of event this is.
    pub event_type: String,
    /// Free-form payload, keyed by string.
    pub data: Map<String, Value>,
    /// When the event was fired.
    pub time_fired: DateTime<Utc>,
    /// Submission provenance.
    pub context: EventContext,
}

impl Event {
    /// Creates an event fired now, with a fresh context.
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::with_context(event_type, data, EventContext::new())
    }

    /// Creates an event fired now, reusing an existing context.
    ///
    /// Use this when the event is a consequence of an earlier
    /// submission and should share its provenance.
    #[must_use]
    pub fn with_context(
        event_type: impl Into<String>,
        data: Map<String, Value>,
        context: EventContext,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            time_fired: Utc::now(),
            context,
        }
    }

    /// Returns a JSON object representation of this event.
    #[must_use]
    pub fn as_json(&self) -> Value {
        serde_json::json!({
            "event_type": self.event_type,
            "data": self.data,
            "time_fired": self.time_fired.to_rfc3339(),
            "context": { "id": self.context.id },
        })
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.data.is_empty() {
            write!(f, "<Event {}>", self.event_type)
        } else {
            write!(f, "<Event {}: {} keys>", self.event_type, self.data.len())
        }
    }
}
