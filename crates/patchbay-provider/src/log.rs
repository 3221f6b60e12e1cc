//! Log-only provider: the minimal built-in.

use crate::{InterfaceRef, ProviderError, ServiceProvider, SinkCallback};
use parking_lot::Mutex;
use patchbay_types::{Attributes, Payload};
use std::collections::HashMap;
use tracing::{debug, info};

/// Provider that logs outbound payloads instead of delivering them.
///
/// Useful for dry-running a wiring definition whose protocols have no
/// real provider on this node: inbound sinks are accepted (and can be
/// driven programmatically via [`push`](Self::push)), outbound
/// emissions land in the log at `info` level.
pub struct LogProvider {
    protocol: String,
    sinks: Mutex<HashMap<String, SinkCallback>>,
}

impl LogProvider {
    /// Creates a log provider serving `protocol`.
    #[must_use]
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            sinks: Mutex::new(HashMap::new()),
        }
    }

    /// Pushes an inbound payload to the sink connected for `output`.
    ///
    /// Returns `false` when no sink is connected under that key.
    pub fn push(&self, output: &InterfaceRef, payload: Payload) -> bool {
        let sink = self.sinks.lock().get(&output.key()).cloned();
        match sink {
            Some(sink) => {
                sink(payload);
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl ServiceProvider for LogProvider {
    fn protocol(&self) -> &str {
        &self.protocol
    }

    async fn setup(&self, _config: &Attributes) -> Result<(), ProviderError> {
        debug!(protocol = %self.protocol, "log provider ready");
        Ok(())
    }

    async fn conn_output_sink(
        &self,
        output: &InterfaceRef,
        _wire_params: &Attributes,
        sink: SinkCallback,
    ) -> Result<(), ProviderError> {
        debug!(output = %output.key(), "log provider sink connected");
        self.sinks.lock().insert(output.key(), sink);
        Ok(())
    }

    async fn conn_input_slot(
        &self,
        input: &InterfaceRef,
        _wire_params: &Attributes,
    ) -> Result<(), ProviderError> {
        debug!(input = %input.key(), "log provider input slot connected");
        Ok(())
    }

    async fn emit_input_slot(
        &self,
        input: &InterfaceRef,
        payload: Payload,
    ) -> Result<(), ProviderError> {
        info!(input = %input.key(), %payload, "emit");
        Ok(())
    }

    async fn disconn_output_sink(&self, output: &InterfaceRef) -> Result<(), ProviderError> {
        self.sinks.lock().remove(&output.key());
        Ok(())
    }
}
