//! The dataflow graph: components, interfaces, wires, transforms.
//!
//! ```text
//!            Component A                       Component B
//!        ┌────────────────┐               ┌────────────────┐
//!  ───►  │ Output "frame" ├──── Wire ────►│ Input "image"  │  ───►
//! inbound└────────────────┘  (WireLoad?)  └────────────────┘outbound
//!  via provider                                via provider
//! ```
//!
//! Wires are owned by the engine's wire registry; interfaces hold
//! shared handles for traversal. Propagation fans out on the control
//! loop: one independently scheduled job per wire, no cross-wire
//! ordering.

mod component;
mod interface;
mod wire;
mod wireload;

pub use component::Component;
pub use interface::{Input, InputHandle, Output};
pub use wire::{Wire, WireEndpoint, WireSummary};
pub use wireload::{WireLoad, WireLoadFactory};
