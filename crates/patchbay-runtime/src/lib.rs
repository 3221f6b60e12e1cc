//! Patchbay runtime - scheduler, event bus and dataflow graph.
//!
//! An edge node wires logical **components** (sensors, actuators,
//! processing blocks) together through typed input/output interfaces
//! and routes payloads over a directed graph of **wires**. All work -
//! callbacks, tasks, blocking calls - dispatches through one
//! coordinating control loop.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      PatchbayEngine                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │  Scheduler   │  │   EventBus   │  │   dataflow graph   │  │
//! │  │ control loop │  │  pub/sub     │  │ Component/Wire/... │  │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//!          ▲                                    ▲
//!          │ commands                           │ payloads
//!   any thread/task                      service providers
//! ```
//!
//! - [`scheduler`] - the single control loop: classifies jobs
//!   (inline / task / blocking), tracks in-flight work, drains it.
//! - [`bus`] - ordered thread-safe publish/subscribe with wildcard
//!   and one-shot subscriptions, independent of the dataflow.
//! - [`graph`] - [`Component`](graph::Component)s, their Output and
//!   Input interfaces, [`Wire`](graph::Wire)s and
//!   [`WireLoad`](graph::WireLoad) transforms.
//! - [`template`] / [`formula`] - declarative component templates,
//!   persisted records for restore, bulk wiring definitions.
//! - [`PatchbayEngine`] - the facade composing all of the above.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use patchbay_provider::{LogProvider, ProviderRegistry};
//! use patchbay_runtime::graph::WireLoadFactory;
//! use patchbay_runtime::PatchbayEngine;
//!
//! # async fn demo() {
//! let providers = Arc::new(ProviderRegistry::new());
//! providers.register(Arc::new(LogProvider::new("mqtt")));
//!
//! let engine = PatchbayEngine::new(providers, Arc::new(WireLoadFactory::new()));
//! // load templates, connect wires ...
//! let exit_code = engine.run().await;
//! # let _ = exit_code;
//! # }
//! ```

pub mod bus;
mod engine;
mod error;
pub mod formula;
pub mod graph;
pub mod scheduler;
pub mod template;

pub use bus::{EventBus, Listener, Subscription};
pub use engine::PatchbayEngine;
pub use error::RuntimeError;
pub use formula::Formula;
pub use scheduler::{ControlLoop, Job, Scheduler};
pub use template::{ComponentRecord, ComponentTemplate, TemplateFile, WireRecord};
