//! Core types for the patchbay edge runtime.
//!
//! This crate is the bottom of the dependency stack. It defines the
//! identifier newtypes shared by every other crate, the open attribute
//! map carried by graph entities, and the [`ErrorCode`] trait that all
//! patchbay error enums implement.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SDK layer                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  patchbay-types    : ID types, Attributes, ErrorCode ◄─ HERE │
//! │  patchbay-event    : Event, EventContext, MATCH_ALL          │
//! │  patchbay-provider : ServiceProvider trait, registry         │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  patchbay-runtime  : scheduler, event bus, dataflow graph    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ComponentId, WireId};

/// Open attribute map carried by every graph entity.
///
/// Keys are free-form strings, values arbitrary JSON. Insertion order
/// is not significant. Attributes are mutable for the entity's
/// lifetime.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Payload routed through the dataflow graph.
///
/// Providers produce and consume payloads at the graph's edges; wire
/// transforms map payloads to payloads. The runtime never inspects the
/// shape of a payload.
pub type Payload = serde_json::Value;
