//! Shared fixtures for the runtime integration suites.

use patchbay_provider::testing::RecordingProvider;
use patchbay_provider::{ProviderRegistry, ServiceProvider};
use patchbay_runtime::graph::WireLoadFactory;
use patchbay_runtime::template::{ComponentTemplate, InterfaceDef, ProtocolDef};
use patchbay_runtime::PatchbayEngine;
use patchbay_types::{Attributes, Payload};
use std::sync::Arc;

/// Protocol every test interface is bound to.
pub const PROTOCOL: &str = "mock";

/// Template with one output interface `reading`.
pub fn sensor_template() -> ComponentTemplate {
    ComponentTemplate {
        name: "sensor".into(),
        inputs: vec![],
        outputs: vec![InterfaceDef {
            name: "reading".into(),
            protocol: ProtocolDef {
                name: PROTOCOL.into(),
                attrs: Attributes::new(),
            },
        }],
    }
}

/// Template with one input interface `command`.
pub fn actuator_template() -> ComponentTemplate {
    ComponentTemplate {
        name: "actuator".into(),
        inputs: vec![InterfaceDef {
            name: "command".into(),
            protocol: ProtocolDef {
                name: PROTOCOL.into(),
                attrs: Attributes::new(),
            },
        }],
        outputs: vec![],
    }
}

/// Engine plus the recording provider behind every interface.
pub struct TestRig {
    pub engine: PatchbayEngine,
    pub provider: Arc<RecordingProvider>,
    pub wireloads: Arc<WireLoadFactory>,
}

/// Builds an engine with the mock provider registered and the sensor
/// and actuator templates loaded.
pub fn rig() -> TestRig {
    let provider = Arc::new(RecordingProvider::new(PROTOCOL));
    let providers = Arc::new(ProviderRegistry::new());
    providers.register(Arc::clone(&provider) as Arc<dyn ServiceProvider>);

    let wireloads = Arc::new(WireLoadFactory::new());
    let engine = PatchbayEngine::new(providers, Arc::clone(&wireloads));
    engine.load_templates([sensor_template(), actuator_template()]);

    TestRig {
        engine,
        provider,
        wireloads,
    }
}

/// Pushes a payload into the sink connected for a component's output.
pub fn push(rig: &TestRig, component: patchbay_types::ComponentId, output: &str, payload: Payload) {
    let component = rig.engine.component(component).expect("component exists");
    let output = component.output(output).expect("output exists");
    rig.provider.push(output.interface_ref(), payload);
}
