//! Service provider boundary for the patchbay edge runtime.
//!
//! A **service provider** translates between the dataflow graph and a
//! concrete protocol (an MQTT broker, a serial bus, a vendor SDK). The
//! runtime core never performs network I/O itself: every Output
//! interface asks its provider to start delivering inbound payloads to
//! a sink callback, and every Input interface hands outbound payloads
//! to its provider for external emission.
//!
//! ```text
//!  external world          patchbay graph           external world
//! ┌─────────────┐  sink   ┌──────┐  wire  ┌──────┐  emit  ┌─────────────┐
//! │ provider in ├────────►│Output├───────►│Input ├───────►│ provider out│
//! └─────────────┘callback └──────┘        └──────┘        └─────────────┘
//! ```
//!
//! Providers are resolved by protocol name through the
//! [`ProviderRegistry`], which hands out one shared instance per
//! protocol (first registration wins).
//!
//! Provider implementations are external to this workspace; the
//! [`LogProvider`] here is the minimal built-in (log-only emission),
//! and [`testing::RecordingProvider`] backs the runtime test suites.

mod error;
mod log;
mod provider;
mod registry;
pub mod testing;

pub use error::ProviderError;
pub use log::LogProvider;
pub use provider::{InterfaceRef, ServiceProvider, SinkCallback};
pub use registry::ProviderRegistry;
