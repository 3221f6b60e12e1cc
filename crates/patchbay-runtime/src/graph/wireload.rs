//! Wire transforms and their registration table.

use parking_lot::RwLock;
use patchbay_types::Payload;
use std::collections::HashMap;
use tracing::debug;

/// A stateful payload transform mounted on a wire.
///
/// `process` maps an input payload to an output payload, or returns
/// `None` to **suppress** it (no delivery). Implementations may hold
/// internal buffers or background threads - a streaming inference
/// stage, say - as long as they honor this synchronous call boundary.
///
/// # Example
///
/// ```
/// use patchbay_runtime::graph::WireLoad;
/// use patchbay_types::Payload;
///
/// /// Drops every payload below a threshold.
/// struct Threshold(f64);
///
/// impl WireLoad for Threshold {
///     fn process(&mut self, payload: Payload) -> Option<Payload> {
///         (payload.as_f64()? >= self.0).then_some(payload)
///     }
/// }
/// ```
pub trait WireLoad: Send {
    /// Transforms one payload, or suppresses it.
    fn process(&mut self, payload: Payload) -> Option<Payload>;
}

type Constructor = Box<dyn Fn() -> Box<dyn WireLoad> + Send + Sync>;

/// Explicit name → constructor table for wire transforms.
///
/// Populated at startup; wiring definitions then refer to transforms
/// declaratively by name. Resolving an unknown name yields `None`,
/// which callers treat as pass-through rather than an error.
pub struct WireLoadFactory {
    constructors: RwLock<HashMap<String, Constructor>>,
}

impl WireLoadFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a constructor under `name`, replacing any previous
    /// registration.
    pub fn register<W, F>(&self, name: impl Into<String>, ctor: F)
    where
        W: WireLoad + 'static,
        F: Fn() -> W + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(%name, "wireload registered");
        self.constructors
            .write()
            .insert(name, Box::new(move || Box::new(ctor())));
    }

    /// Constructs a fresh transform instance by name.
    #[must_use]
    pub fn create(&self, name: &str) -> Option<Box<dyn WireLoad>> {
        self.constructors.read().get(name).map(|ctor| ctor())
    }

    /// Returns `true` if a constructor is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.read().contains_key(name)
    }

    /// Registered transform names, unordered.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.constructors.read().keys().cloned().collect()
    }
}

impl Default for WireLoadFactory {
    fn default() -> Self {
        Self::new()
    }
}
