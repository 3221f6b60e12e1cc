//! Test doubles for provider-facing code.
//!
//! [`RecordingProvider`] plays both provider roles needed by the
//! runtime test suites: it captures everything emitted through input
//! slots, and it exposes connected output sinks so a test can inject
//! inbound payloads as if they arrived from the external world.

use crate::{InterfaceRef, ProviderError, ServiceProvider, SinkCallback};
use parking_lot::Mutex;
use patchbay_types::{Attributes, Payload};
use std::collections::HashMap;

/// One recorded emission: which input slot, which payload.
#[derive(Debug, Clone)]
pub struct RecordedEmit {
    /// Destination input descriptor.
    pub input: InterfaceRef,
    /// Payload handed to the provider.
    pub payload: Payload,
}

/// In-memory provider recording all traffic that crosses it.
pub struct RecordingProvider {
    protocol: String,
    sinks: Mutex<HashMap<String, SinkCallback>>,
    emitted: Mutex<Vec<RecordedEmit>>,
    fail_emits: Mutex<bool>,
}

impl RecordingProvider {
    /// Creates a recording provider for `protocol`.
    #[must_use]
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            sinks: Mutex::new(HashMap::new()),
            emitted: Mutex::new(Vec::new()),
            fail_emits: Mutex::new(false),
        }
    }

    /// Injects an inbound payload into the sink connected for `output`.
    ///
    /// # Panics
    ///
    /// Panics when no sink is connected for the output - in a test
    /// that means the wire under test was never connected.
    pub fn push(&self, output: &InterfaceRef, payload: Payload) {
        let sink = self
            .sinks
            .lock()
            .get(&output.key())
            .cloned()
            .unwrap_or_else(|| panic!("no sink connected for {}", output.key()));
        sink(payload);
    }

    /// Returns `true` if a sink is currently connected for `output`.
    #[must_use]
    pub fn has_sink(&self, output: &InterfaceRef) -> bool {
        self.sinks.lock().contains_key(&output.key())
    }

    /// All emissions recorded so far.
    #[must_use]
    pub fn emitted(&self) -> Vec<RecordedEmit> {
        self.emitted.lock().clone()
    }

    /// Payloads emitted to the input named `input_name`.
    #[must_use]
    pub fn emitted_to(&self, input_name: &str) -> Vec<Payload> {
        self.emitted
            .lock()
            .iter()
            .filter(|rec| rec.input.name == input_name)
            .map(|rec| rec.payload.clone())
            .collect()
    }

    /// Makes every subsequent emit fail, to exercise error paths.
    pub fn fail_emits(&self, fail: bool) {
        *self.fail_emits.lock() = fail;
    }
}

#[async_trait::async_trait]
impl ServiceProvider for RecordingProvider {
    fn protocol(&self) -> &str {
        &self.protocol
    }

    async fn setup(&self, _config: &Attributes) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn conn_output_sink(
        &self,
        output: &InterfaceRef,
        _wire_params: &Attributes,
        sink: SinkCallback,
    ) -> Result<(), ProviderError> {
        self.sinks.lock().insert(output.key(), sink);
        Ok(())
    }

    async fn conn_input_slot(
        &self,
        _input: &InterfaceRef,
        _wire_params: &Attributes,
    ) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn emit_input_slot(
        &self,
        input: &InterfaceRef,
        payload: Payload,
    ) -> Result<(), ProviderError> {
        if *self.fail_emits.lock() {
            return Err(ProviderError::Emit("recording provider set to fail".into()));
        }
        self.emitted.lock().push(RecordedEmit {
            input: input.clone(),
            payload,
        });
        Ok(())
    }

    async fn disconn_output_sink(&self, output: &InterfaceRef) -> Result<(), ProviderError> {
        self.sinks.lock().remove(&output.key());
        Ok(())
    }
}
