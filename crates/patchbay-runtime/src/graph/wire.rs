//! Directed edges between an Output and an Input.

use super::interface::InputHandle;
use super::wireload::WireLoad;
use parking_lot::{Mutex, RwLock};
use patchbay_types::{Attributes, ComponentId, Payload, WireId};
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, warn};

/// One end of a wire: a component and one of its interface names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireEndpoint {
    /// Component owning the interface.
    pub component: ComponentId,
    /// Interface name on that component.
    pub interface: String,
}

/// Introspection snapshot of a wire, for callers that must not hold
/// graph handles (CLI listings, removal results).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireSummary {
    /// Wire id.
    pub id: WireId,
    /// Source Output endpoint.
    pub source: WireEndpoint,
    /// Destination Input endpoint.
    pub dest: WireEndpoint,
    /// Whether a transform is mounted.
    pub has_wireload: bool,
}

/// A directed connection from one Output to one Input.
///
/// Source and destination are fixed at construction; disconnecting a
/// wire removes it from both endpoints' wire maps but never destroys
/// the endpoints. At most one [`WireLoad`] transform is mounted;
/// absence means payloads pass through unchanged.
///
/// The two parameter maps are reserved for protocol-specific tuning
/// (handed to providers at connect time); they do not affect the
/// transform.
pub struct Wire {
    id: WireId,
    source: WireEndpoint,
    dest: WireEndpoint,
    input: InputHandle,
    wireload: Option<Mutex<Box<dyn WireLoad>>>,
    input_params: RwLock<Attributes>,
    output_params: RwLock<Attributes>,
}

impl Wire {
    pub(crate) fn new(
        id: WireId,
        source: WireEndpoint,
        dest: WireEndpoint,
        input: InputHandle,
        wireload: Option<Box<dyn WireLoad>>,
    ) -> Self {
        Self {
            id,
            source,
            dest,
            input,
            wireload: wireload.map(Mutex::new),
            input_params: RwLock::new(Attributes::new()),
            output_params: RwLock::new(Attributes::new()),
        }
    }

    /// Wire id.
    #[must_use]
    pub fn id(&self) -> WireId {
        self.id
    }

    /// Source Output endpoint.
    #[must_use]
    pub fn source(&self) -> &WireEndpoint {
        &self.source
    }

    /// Destination Input endpoint.
    #[must_use]
    pub fn dest(&self) -> &WireEndpoint {
        &self.dest
    }

    /// Whether a transform is mounted on this wire.
    #[must_use]
    pub fn has_wireload(&self) -> bool {
        self.wireload.is_some()
    }

    /// Replaces the input-side parameter map.
    pub fn set_input_params(&self, params: Attributes) {
        *self.input_params.write() = params;
    }

    /// Replaces the output-side parameter map.
    pub fn set_output_params(&self, params: Attributes) {
        *self.output_params.write() = params;
    }

    /// Current input-side parameters.
    #[must_use]
    pub fn input_params(&self) -> Attributes {
        self.input_params.read().clone()
    }

    /// Current output-side parameters.
    #[must_use]
    pub fn output_params(&self) -> Attributes {
        self.output_params.read().clone()
    }

    /// Introspection snapshot.
    #[must_use]
    pub fn summary(&self) -> WireSummary {
        WireSummary {
            id: self.id,
            source: self.source.clone(),
            dest: self.dest.clone(),
            has_wireload: self.has_wireload(),
        }
    }

    /// Propagates one payload: transform (if mounted), then deliver to
    /// the destination Input's provider.
    ///
    /// The transform is serialized behind a mutex, but concurrent
    /// arrivals may still complete delivery out of order; arrival
    /// order is only preserved end-to-end if the transform itself
    /// serializes its pipeline.
    ///
    /// A transform that panics drops the payload (logged); it never
    /// takes down the propagation job's loop.
    pub async fn fire(&self, payload: Payload) {
        let data = match &self.wireload {
            Some(load) => {
                let result = {
                    let mut guard = load.lock();
                    std::panic::catch_unwind(AssertUnwindSafe(|| guard.process(payload)))
                };
                match result {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        debug!(wire = %self.id, "payload suppressed by transform");
                        return;
                    }
                    Err(_) => {
                        error!(wire = %self.id, "transform panicked, payload dropped");
                        return;
                    }
                }
            }
            None => payload,
        };

        if let Err(err) = self.input.emit(data).await {
            warn!(wire = %self.id, error = %err, "delivery to input provider failed");
        }
    }
}

impl std::fmt::Debug for Wire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wire")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("dest", &self.dest)
            .field("has_wireload", &self.has_wireload())
            .finish()
    }
}
