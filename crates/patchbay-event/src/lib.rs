//! Event values for the patchbay edge runtime.
//!
//! The event bus (in `patchbay-runtime`) distributes cross-cutting
//! notifications - lifecycle changes, state changes - independently of
//! the wire dataflow. This crate holds only the value types and the
//! well-known event-type vocabulary, so SDK consumers can construct
//! and match events without depending on the runtime.
//!
//! # Message Flow
//!
//! ```text
//! ┌────────────┐  fire(type, data)   ┌────────────┐
//! │ any thread │ ──────────────────► │  EventBus  │
//! └────────────┘                     └────────────┘
//!                                          │ one job per listener
//!               ┌──────────────┬───────────┴──┐
//!               ▼              ▼              ▼
//!          listener A     listener B     "*" listener
//! ```
//!
//! # Wildcard
//!
//! Subscribing with [`MATCH_ALL`] receives every event. During
//! dispatch, wildcard listeners are invoked ahead of type-specific
//! listeners.

mod event;

pub use event::{Event, EventContext};

/// Wildcard sentinel: listen to every event type.
pub const MATCH_ALL: &str = "*";

/// Fired once the engine has finished its startup sequencing.
pub const EVENT_ENGINE_START: &str = "engine_start";

/// Fired when the engine begins shutting down.
pub const EVENT_ENGINE_STOP: &str = "engine_stop";

/// Fired when a component reports a state change.
pub const EVENT_STATE_CHANGED: &str = "state_changed";
