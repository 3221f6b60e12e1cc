//! The [`ServiceProvider`] contract and the interface descriptor
//! passed across it.

use crate::ProviderError;
use patchbay_types::{Attributes, ComponentId, Payload};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Callback a provider invokes for each inbound payload.
///
/// The runtime installs a closure here that marshals the payload onto
/// the control loop; providers may call it from any thread.
pub type SinkCallback = Arc<dyn Fn(Payload) + Send + Sync>;

/// Value descriptor of an interface, as seen by a provider.
///
/// Providers never borrow graph internals; connect and emit calls
/// receive this self-contained description of the endpoint instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRef {
    /// Owning component.
    pub component: ComponentId,
    /// Interface name, unique within the component.
    pub name: String,
    /// Protocol this interface is bound to.
    pub protocol: String,
    /// Protocol-specific attribute set from the component template.
    pub attrs: Attributes,
}

impl InterfaceRef {
    /// Stable key identifying this interface within its protocol.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.component, self.name)
    }
}

/// Adapter between the dataflow graph and one concrete protocol.
///
/// One instance serves every interface bound to its protocol; state
/// that is per-interface must be keyed by [`InterfaceRef::key`].
///
/// # Contract
///
/// - [`conn_output_sink`](Self::conn_output_sink) must arrange for
///   `sink` to be invoked once per inbound datum. The runtime's sink
///   marshals onto the control loop, so providers may call it from
///   their own threads.
/// - [`emit_input_slot`](Self::emit_input_slot) delivers a payload to
///   the external system; errors are reported to the caller and must
///   not poison provider state.
/// - [`disconn_output_sink`](Self::disconn_output_sink) stops inbound
///   delivery for the given output. Calling it for an output that was
///   never connected is a no-op.
#[async_trait::async_trait]
pub trait ServiceProvider: Send + Sync {
    /// Protocol name this provider serves (registry key).
    fn protocol(&self) -> &str;

    /// One-time provider initialization with protocol configuration.
    async fn setup(&self, config: &Attributes) -> Result<(), ProviderError>;

    /// Begins delivering inbound payloads for `output` to `sink`.
    async fn conn_output_sink(
        &self,
        output: &InterfaceRef,
        wire_params: &Attributes,
        sink: SinkCallback,
    ) -> Result<(), ProviderError>;

    /// Prepares the external side of an input slot.
    async fn conn_input_slot(
        &self,
        input: &InterfaceRef,
        wire_params: &Attributes,
    ) -> Result<(), ProviderError>;

    /// Delivers `payload` to the external system behind `input`.
    async fn emit_input_slot(
        &self,
        input: &InterfaceRef,
        payload: Payload,
    ) -> Result<(), ProviderError>;

    /// Stops inbound delivery for `output`.
    async fn disconn_output_sink(&self, output: &InterfaceRef) -> Result<(), ProviderError>;
}
