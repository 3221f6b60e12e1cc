//! Output and Input interfaces.
//!
//! An interface belongs to exactly one component and is bound to one
//! protocol; its provider is the shared instance the registry resolved
//! for that protocol at instantiation time.

use super::wire::Wire;
use crate::scheduler::{Job, Scheduler};
use crate::template::InterfaceDef;
use parking_lot::RwLock;
use patchbay_provider::{InterfaceRef, ProviderError, ServiceProvider, SinkCallback};
use patchbay_types::{Attributes, ComponentId, Payload, WireId};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type WireMap = Arc<RwLock<HashMap<WireId, Arc<Wire>>>>;

fn wires_info(wires: &WireMap) -> Value {
    let map: serde_json::Map<String, Value> = wires
        .read()
        .values()
        .map(|wire| {
            (
                wire.id().to_string(),
                serde_json::to_value(wire.summary()).unwrap_or(Value::Null),
            )
        })
        .collect();
    Value::Object(map)
}

/// An Output: the source endpoint receiving data from the external
/// world through its provider.
pub struct Output {
    iface: InterfaceRef,
    provider: Arc<dyn ServiceProvider>,
    wires: WireMap,
}

impl Output {
    pub(crate) fn new(
        component: ComponentId,
        def: &InterfaceDef,
        provider: Arc<dyn ServiceProvider>,
    ) -> Self {
        Self {
            iface: InterfaceRef {
                component,
                name: def.name.clone(),
                protocol: def.protocol.name.clone(),
                attrs: def.protocol.attrs.clone(),
            },
            provider,
            wires: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Interface name within the component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.iface.name
    }

    /// Bound protocol name.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.iface.protocol
    }

    /// Descriptor handed to providers.
    #[must_use]
    pub fn interface_ref(&self) -> &InterfaceRef {
        &self.iface
    }

    pub(crate) fn add_wire(&self, wire: Arc<Wire>) {
        self.wires.write().insert(wire.id(), wire);
    }

    pub(crate) fn remove_wire(&self, id: WireId) -> bool {
        self.wires.write().remove(&id).is_some()
    }

    /// Ids of the wires starting at this output.
    #[must_use]
    pub fn wire_ids(&self) -> Vec<WireId> {
        self.wires.read().keys().copied().collect()
    }

    /// Number of attached wires.
    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.wires.read().len()
    }

    /// JSON summary of the attached wires.
    #[must_use]
    pub fn wires_info(&self) -> Value {
        wires_info(&self.wires)
    }

    /// Asks the provider to start delivering inbound payloads.
    ///
    /// The installed sink marshals each payload onto the control loop,
    /// where it fans out as one independently scheduled job per
    /// attached wire. This is the only path by which external data
    /// begins flowing into wires.
    pub(crate) async fn conn_output_sink(
        &self,
        scheduler: &Scheduler,
        wire_params: &Attributes,
    ) -> Result<(), ProviderError> {
        let sink = self.sink_callback(scheduler.clone());
        self.provider
            .conn_output_sink(&self.iface, wire_params, sink)
            .await
    }

    /// Asks the provider to stop inbound delivery.
    pub(crate) async fn disconn_output_sink(&self) -> Result<(), ProviderError> {
        self.provider.disconn_output_sink(&self.iface).await
    }

    fn sink_callback(&self, scheduler: Scheduler) -> SinkCallback {
        let wires = Arc::clone(&self.wires);
        let name = self.iface.key();
        Arc::new(move |payload: Payload| {
            let wires = Arc::clone(&wires);
            let name = name.clone();
            scheduler.submit(Job::inline(move |ctx| {
                let attached: Vec<Arc<Wire>> = wires.read().values().cloned().collect();
                debug!(output = %name, wires = attached.len(), "inbound payload");
                for wire in attached {
                    let payload = payload.clone();
                    ctx.submit(Job::task(async move {
                        wire.fire(payload).await;
                    }));
                }
            }));
        })
    }
}

/// An Input: the sink endpoint handing data to the external world
/// through its provider.
pub struct Input {
    iface: InterfaceRef,
    provider: Arc<dyn ServiceProvider>,
    wires: WireMap,
}

impl Input {
    pub(crate) fn new(
        component: ComponentId,
        def: &InterfaceDef,
        provider: Arc<dyn ServiceProvider>,
    ) -> Self {
        Self {
            iface: InterfaceRef {
                component,
                name: def.name.clone(),
                protocol: def.protocol.name.clone(),
                attrs: def.protocol.attrs.clone(),
            },
            provider,
            wires: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Interface name within the component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.iface.name
    }

    /// Bound protocol name.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.iface.protocol
    }

    /// Descriptor handed to providers.
    #[must_use]
    pub fn interface_ref(&self) -> &InterfaceRef {
        &self.iface
    }

    pub(crate) fn add_wire(&self, wire: Arc<Wire>) {
        self.wires.write().insert(wire.id(), wire);
    }

    pub(crate) fn remove_wire(&self, id: WireId) -> bool {
        self.wires.write().remove(&id).is_some()
    }

    /// Ids of the wires ending at this input.
    #[must_use]
    pub fn wire_ids(&self) -> Vec<WireId> {
        self.wires.read().keys().copied().collect()
    }

    /// Number of attached wires.
    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.wires.read().len()
    }

    /// JSON summary of the attached wires.
    #[must_use]
    pub fn wires_info(&self) -> Value {
        wires_info(&self.wires)
    }

    /// Prepares the provider side of this slot for a new wire.
    pub(crate) async fn conn_input_slot(
        &self,
        wire_params: &Attributes,
    ) -> Result<(), ProviderError> {
        self.provider.conn_input_slot(&self.iface, wire_params).await
    }

    /// Forwards a payload to the provider for external emission.
    pub async fn emit(&self, payload: Payload) -> Result<(), ProviderError> {
        self.provider.emit_input_slot(&self.iface, payload).await
    }

    /// Cheap handle wires hold to deliver into this input without
    /// touching the component registry.
    #[must_use]
    pub fn handle(&self) -> InputHandle {
        InputHandle {
            iface: self.iface.clone(),
            provider: Arc::clone(&self.provider),
        }
    }
}

/// Detached delivery handle for an [`Input`].
#[derive(Clone)]
pub struct InputHandle {
    iface: InterfaceRef,
    provider: Arc<dyn ServiceProvider>,
}

impl InputHandle {
    /// Forwards a payload to the provider for external emission.
    pub async fn emit(&self, payload: Payload) -> Result<(), ProviderError> {
        self.provider.emit_input_slot(&self.iface, payload).await
    }

    /// Descriptor of the destination input.
    #[must_use]
    pub fn interface_ref(&self) -> &InterfaceRef {
        &self.iface
    }
}
