//! PatchbayEngine - the runtime facade.
//!
//! Composes the scheduler, the event bus, the provider registry, the
//! transform factory and the graph registries, and exposes the
//! graph-mutation API: instantiate components, connect and disconnect
//! interfaces, restore persisted graphs, apply bulk wiring formulas.
//!
//! # Lifecycle
//!
//! ```text
//! new() ─► load_templates ─► generate / connect / load_formula
//!             │
//!             ▼
//!          run():  async_start ─► park until stop(code) ─► exit code
//! ```
//!
//! Startup fires [`EVENT_ENGINE_START`], disables task tracking (so
//! the pending set stays bounded under steady-state traffic) and
//! drains once under a 15 second deadline. The deadline only guards
//! against a misbehaving start listener stalling boot; exceeding it
//! is logged and startup proceeds.

use crate::bus::EventBus;
use crate::error::RuntimeError;
use crate::formula::Formula;
use crate::graph::{Component, Wire, WireEndpoint, WireLoadFactory, WireSummary};
use crate::scheduler::Scheduler;
use crate::template::{ComponentRecord, ComponentTemplate, WireRecord};
use parking_lot::RwLock;
use patchbay_event::{EVENT_ENGINE_START, EVENT_ENGINE_STOP};
use patchbay_provider::ProviderRegistry;
use patchbay_types::{Attributes, ComponentId, WireId};
use serde_json::Map;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Deadline for the startup drain. Protects boot from a stalled start
/// listener; advisory only.
const STARTUP_DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Root object of a patchbay edge node.
pub struct PatchbayEngine {
    scheduler: Scheduler,
    bus: EventBus,
    providers: Arc<ProviderRegistry>,
    wireloads: Arc<WireLoadFactory>,
    templates: RwLock<HashMap<String, ComponentTemplate>>,
    components: RwLock<HashMap<ComponentId, Arc<Component>>>,
    wires: RwLock<HashMap<WireId, Arc<Wire>>>,
}

impl PatchbayEngine {
    /// Creates an engine and spawns its control loop onto the current
    /// runtime.
    #[must_use]
    pub fn new(providers: Arc<ProviderRegistry>, wireloads: Arc<WireLoadFactory>) -> Self {
        let scheduler = Scheduler::spawn();
        let bus = EventBus::new(scheduler.clone());
        info!("patchbay engine created");
        Self {
            scheduler,
            bus,
            providers,
            wireloads,
            templates: RwLock::new(HashMap::new()),
            components: RwLock::new(HashMap::new()),
            wires: RwLock::new(HashMap::new()),
        }
    }

    /// The engine's scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The engine's event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The provider registry.
    #[must_use]
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// The transform factory.
    #[must_use]
    pub fn wireloads(&self) -> &WireLoadFactory {
        &self.wireloads
    }

    // === Templates ===

    /// Registers a component template under its name.
    pub fn load_template(&self, template: ComponentTemplate) {
        debug!(template = %template.name, "template loaded");
        self.templates
            .write()
            .insert(template.name.clone(), template);
    }

    /// Registers several templates at once.
    pub fn load_templates(&self, templates: impl IntoIterator<Item = ComponentTemplate>) {
        for template in templates {
            self.load_template(template);
        }
    }

    /// Names of the loaded templates, unordered.
    #[must_use]
    pub fn template_names(&self) -> Vec<String> {
        self.templates.read().keys().cloned().collect()
    }

    // === Components ===

    /// Instantiates a component from a loaded template.
    ///
    /// An explicit `id` is honored (restore path); callers must not
    /// reuse a live id.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::TemplateNotFound`] for an unknown template
    /// name; [`RuntimeError::Provider`] when an interface protocol has
    /// no provider.
    pub fn generate_component_instance(
        &self,
        template_name: &str,
        id: Option<ComponentId>,
    ) -> Result<ComponentId, RuntimeError> {
        let template = self
            .templates
            .read()
            .get(template_name)
            .cloned()
            .ok_or_else(|| {
                warn!(template_name, "unknown component template");
                RuntimeError::TemplateNotFound(template_name.to_string())
            })?;

        let component = Component::from_template(&template, id, &self.providers)?;
        let id = component.id();
        self.components.write().insert(id, Arc::new(component));
        debug!(component = %id, template_name, "component instantiated");
        Ok(id)
    }

    /// Looks up a live component.
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<Arc<Component>> {
        self.components.read().get(&id).cloned()
    }

    /// Number of live components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.read().len()
    }

    /// Removes a component from the registry.
    ///
    /// Wires attached to its interfaces stay in the wire registry
    /// until disconnected explicitly.
    #[must_use]
    pub fn remove_component(&self, id: ComponentId) -> Option<Arc<Component>> {
        self.components.write().remove(&id)
    }

    // === Wires ===

    /// Connects an Output to an Input with a new wire.
    ///
    /// Resolves both interfaces, constructs the wire (with the
    /// optional named transform), registers it on both endpoints and
    /// in the wire registry, then asks the Output's provider to start
    /// delivering inbound payloads. This is the only path by which
    /// external data begins flowing into a wire.
    ///
    /// An unknown `wireload_name` is logged and treated as
    /// pass-through, not an error.
    pub async fn connect_interface(
        &self,
        output_component: ComponentId,
        output_name: &str,
        input_component: ComponentId,
        input_name: &str,
        wire_id: Option<WireId>,
        wireload_name: Option<&str>,
    ) -> Result<WireId, RuntimeError> {
        let source_com = self
            .component(output_component)
            .ok_or(RuntimeError::ComponentNotFound(output_component))?;
        let dest_com = self
            .component(input_component)
            .ok_or(RuntimeError::ComponentNotFound(input_component))?;

        let output = source_com
            .output(output_name)
            .ok_or_else(|| RuntimeError::InterfaceNotFound {
                component: output_component,
                name: output_name.to_string(),
                direction: "output",
            })?;
        let input = dest_com
            .input(input_name)
            .ok_or_else(|| RuntimeError::InterfaceNotFound {
                component: input_component,
                name: input_name.to_string(),
                direction: "input",
            })?;

        let wireload = wireload_name.and_then(|name| {
            let load = self.wireloads.create(name);
            if load.is_none() {
                warn!(wireload = name, "unknown wireload, passing through");
            }
            load
        });

        let id = wire_id.unwrap_or_else(WireId::new);
        let wire = Arc::new(Wire::new(
            id,
            WireEndpoint {
                component: output_component,
                interface: output_name.to_string(),
            },
            WireEndpoint {
                component: input_component,
                interface: input_name.to_string(),
            },
            input.handle(),
            wireload,
        ));

        self.wires.write().insert(id, Arc::clone(&wire));
        output.add_wire(Arc::clone(&wire));
        input.add_wire(Arc::clone(&wire));

        input.conn_input_slot(&wire.input_params()).await?;
        output
            .conn_output_sink(&self.scheduler, &wire.output_params())
            .await?;

        info!(wire = %id, output = %output.interface_ref().key(), input = %input.interface_ref().key(), "wire connected");
        Ok(id)
    }

    /// Disconnects a wire.
    ///
    /// Removes it from both endpoints' wire maps and the registry; the
    /// endpoints themselves are untouched. When the source Output has
    /// no wires left, its provider sink is disconnected too.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::WireNotFound`] for an unknown id (logged).
    pub async fn delete_wire(&self, wire_id: WireId) -> Result<WireSummary, RuntimeError> {
        let wire = self.wires.write().remove(&wire_id).ok_or_else(|| {
            warn!(wire = %wire_id, "cannot disconnect unknown wire");
            RuntimeError::WireNotFound(wire_id)
        })?;

        let summary = wire.summary();
        let mut disconnect_sink = None;

        if let Some(component) = self.component(summary.source.component) {
            if let Some(output) = component.output(&summary.source.interface) {
                output.remove_wire(wire_id);
                if output.wire_count() == 0 {
                    disconnect_sink = Some(Arc::clone(&component));
                }
            }
        }
        if let Some(component) = self.component(summary.dest.component) {
            if let Some(input) = component.input(&summary.dest.interface) {
                input.remove_wire(wire_id);
            }
        }

        // Last wire gone: stop inbound delivery for the output.
        if let Some(component) = disconnect_sink {
            if let Some(output) = component.output(&summary.source.interface) {
                output.disconn_output_sink().await?;
            }
        }

        info!(wire = %wire_id, "wire disconnected");
        Ok(summary)
    }

    /// Looks up a live wire.
    #[must_use]
    pub fn wire(&self, id: WireId) -> Option<Arc<Wire>> {
        self.wires.read().get(&id).cloned()
    }

    /// Number of live wires.
    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.wires.read().len()
    }

    // === Restore ===

    /// Rebuilds a graph from persisted records.
    ///
    /// Components are materialized first, then wires. A record whose
    /// lookup fails is skipped with a warning; all other records still
    /// restore. Returns the number of components and wires restored.
    pub async fn restore(
        &self,
        components: &[ComponentRecord],
        wires: &[WireRecord],
    ) -> (usize, usize) {
        let mut restored_components = 0;
        for record in components {
            match self.generate_component_instance(&record.template_name, Some(record.id)) {
                Ok(_) => restored_components += 1,
                Err(err) => {
                    warn!(component = %record.id, template = %record.template_name, error = %err,
                        "skipping component record");
                }
            }
        }

        let mut restored_wires = 0;
        for record in wires {
            let result = self
                .connect_interface(
                    record.output_component,
                    &record.output_name,
                    record.input_component,
                    &record.input_name,
                    Some(record.id),
                    record.wireload.as_deref(),
                )
                .await;
            match result {
                Ok(_) => restored_wires += 1,
                Err(err) => {
                    warn!(wire = %record.id, error = %err, "skipping wire record");
                }
            }
        }

        info!(restored_components, restored_wires, "graph restored");
        (restored_components, restored_wires)
    }

    // === Formulas ===

    /// Applies a bulk wiring definition: each wire spec instantiates
    /// its endpoint components by template name, then connects them.
    ///
    /// All-or-nothing: every reference is validated before anything is
    /// instantiated, and any defect aborts the whole load.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::FormulaLoad`] describing the first defect.
    pub async fn load_formula(&self, formula: &Formula) -> Result<(), RuntimeError> {
        self.validate_formula(formula)?;

        for spec in &formula.wires {
            let output_com =
                self.generate_component_instance(&spec.output_slot.component, None)?;
            let input_com = self.generate_component_instance(&spec.input_sink.component, None)?;
            self.connect_interface(
                output_com,
                &spec.output_slot.output.name,
                input_com,
                &spec.input_sink.input.name,
                None,
                spec.wireload.as_ref().map(|load| load.name.as_str()),
            )
            .await?;
        }

        info!(wires = formula.wires.len(), "formula loaded");
        Ok(())
    }

    /// Checks every template, interface and protocol reference of a
    /// formula without touching the graph.
    fn validate_formula(&self, formula: &Formula) -> Result<(), RuntimeError> {
        let templates = self.templates.read();
        for (index, spec) in formula.wires.iter().enumerate() {
            let output_template = templates.get(&spec.output_slot.component).ok_or_else(|| {
                RuntimeError::FormulaLoad(format!(
                    "wire {index}: unknown template '{}'",
                    spec.output_slot.component
                ))
            })?;
            let input_template = templates.get(&spec.input_sink.component).ok_or_else(|| {
                RuntimeError::FormulaLoad(format!(
                    "wire {index}: unknown template '{}'",
                    spec.input_sink.component
                ))
            })?;

            let output_def = output_template
                .outputs
                .iter()
                .find(|def| def.name == spec.output_slot.output.name)
                .ok_or_else(|| {
                    RuntimeError::FormulaLoad(format!(
                        "wire {index}: template '{}' has no output '{}'",
                        output_template.name, spec.output_slot.output.name
                    ))
                })?;
            let input_def = input_template
                .inputs
                .iter()
                .find(|def| def.name == spec.input_sink.input.name)
                .ok_or_else(|| {
                    RuntimeError::FormulaLoad(format!(
                        "wire {index}: template '{}' has no input '{}'",
                        input_template.name, spec.input_sink.input.name
                    ))
                })?;

            for def in [output_def, input_def] {
                if self.providers.get(&def.protocol.name).is_none() {
                    return Err(RuntimeError::FormulaLoad(format!(
                        "wire {index}: no provider for protocol '{}'",
                        def.protocol.name
                    )));
                }
            }
        }
        Ok(())
    }

    // === Lifecycle ===

    /// Finalizes startup.
    ///
    /// Fires [`EVENT_ENGINE_START`], disables tracking for
    /// steady-state traffic, and drains startup work under a bounded
    /// deadline. A timeout is logged and non-fatal.
    pub async fn async_start(&self) {
        info!("starting patchbay engine");
        self.bus.fire(EVENT_ENGINE_START, Map::new());
        self.scheduler.set_tracking(false);

        if tokio::time::timeout(STARTUP_DRAIN_TIMEOUT, self.scheduler.drain())
            .await
            .is_err()
        {
            warn!(
                timeout_secs = STARTUP_DRAIN_TIMEOUT.as_secs(),
                "something is blocking startup from wrapping up, continuing anyway"
            );
        }
    }

    /// Starts the engine and parks until [`stop`](Self::stop).
    /// Returns the exit code.
    pub async fn run(&self) -> i32 {
        self.async_start().await;
        self.scheduler.wait_stopped().await
    }

    /// Stops the engine with an exit code.
    pub fn stop(&self, code: i32) {
        info!(code, "stopping patchbay engine");
        self.bus.fire(EVENT_ENGINE_STOP, Map::new());
        self.scheduler.stop(code);
    }

    /// Convenience: replaces a wire's parameter maps.
    pub fn set_wire_params(
        &self,
        wire_id: WireId,
        input_params: Option<Attributes>,
        output_params: Option<Attributes>,
    ) -> Result<(), RuntimeError> {
        let wire = self
            .wire(wire_id)
            .ok_or(RuntimeError::WireNotFound(wire_id))?;
        if let Some(params) = input_params {
            wire.set_input_params(params);
        }
        if let Some(params) = output_params {
            wire.set_output_params(params);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{InterfaceDef, ProtocolDef};
    use patchbay_provider::LogProvider;

    fn engine() -> PatchbayEngine {
        let providers = Arc::new(ProviderRegistry::new());
        providers.register(Arc::new(LogProvider::new("mqtt")));
        PatchbayEngine::new(providers, Arc::new(WireLoadFactory::new()))
    }

    fn relay_template() -> ComponentTemplate {
        ComponentTemplate {
            name: "relay".into(),
            inputs: vec![InterfaceDef {
                name: "coil".into(),
                protocol: ProtocolDef {
                    name: "mqtt".into(),
                    attrs: Attributes::new(),
                },
            }],
            outputs: vec![],
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn templates_register_by_name() {
        let engine = engine();
        engine.load_template(relay_template());
        assert_eq!(engine.template_names(), vec!["relay".to_string()]);
        engine.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_template_is_not_found() {
        let engine = engine();
        let err = engine.generate_component_instance("ghost", None).unwrap_err();
        assert!(matches!(err, RuntimeError::TemplateNotFound(_)));
        engine.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn instantiate_and_remove_component() {
        let engine = engine();
        engine.load_template(relay_template());

        let id = engine.generate_component_instance("relay", None).unwrap();
        assert_eq!(engine.component_count(), 1);
        assert_eq!(
            engine.component(id).unwrap().template_name(),
            "relay"
        );

        assert!(engine.remove_component(id).is_some());
        assert_eq!(engine.component_count(), 0);
        engine.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn wire_params_require_a_live_wire() {
        let engine = engine();
        let err = engine
            .set_wire_params(WireId::new(), Some(Attributes::new()), None)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::WireNotFound(_)));
        engine.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn startup_completes_within_the_deadline() {
        let engine = engine();
        tokio::time::timeout(Duration::from_secs(5), engine.async_start())
            .await
            .expect("startup drain must finish well inside the deadline");
        engine.stop(0);
    }
}
