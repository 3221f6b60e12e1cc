//! Graph restore from persisted records, and bulk formula loading.

mod common;

use common::{push, rig};
use patchbay_runtime::formula::{
    Formula, FormulaWire, InputSink, NamedInterface, OutputSlot, WireLoadRef,
};
use patchbay_runtime::template::{ComponentRecord, WireRecord};
use patchbay_types::{ComponentId, WireId};
use serde_json::json;

fn records() -> (Vec<ComponentRecord>, Vec<WireRecord>) {
    let sensor_id = ComponentId::new();
    let actuator_id = ComponentId::new();
    let components = vec![
        ComponentRecord {
            template_name: "sensor".into(),
            id: sensor_id,
        },
        ComponentRecord {
            template_name: "actuator".into(),
            id: actuator_id,
        },
    ];
    let wires = vec![WireRecord {
        id: WireId::new(),
        output_component: sensor_id,
        output_name: "reading".into(),
        input_component: actuator_id,
        input_name: "command".into(),
        wireload: None,
    }];
    (components, wires)
}

#[tokio::test(flavor = "multi_thread")]
async fn restore_rebuilds_the_exact_graph() {
    let rig = rig();
    let (components, wires) = records();

    let (restored_components, restored_wires) = rig.engine.restore(&components, &wires).await;
    assert_eq!((restored_components, restored_wires), (2, 1));
    assert_eq!(rig.engine.component_count(), 2);
    assert_eq!(rig.engine.wire_count(), 1);

    // Stable ids survived the round trip.
    for record in &components {
        let component = rig.engine.component(record.id).expect("restored");
        assert_eq!(component.template_name(), record.template_name);
    }

    // The restored wire resolves to exactly the recorded endpoints.
    let summary = rig.engine.wire(wires[0].id).expect("restored").summary();
    assert_eq!(summary.source.component, wires[0].output_component);
    assert_eq!(summary.source.interface, "reading");
    assert_eq!(summary.dest.component, wires[0].input_component);
    assert_eq!(summary.dest.interface, "command");
    rig.engine.stop(0);
}

#[tokio::test(flavor = "multi_thread")]
async fn restored_graph_carries_traffic() {
    let rig = rig();
    let (components, wires) = records();
    rig.engine.restore(&components, &wires).await;

    push(&rig, components[0].id, "reading", json!(3));
    rig.engine.scheduler().drain().await;

    assert_eq!(rig.provider.emitted_to("command"), vec![json!(3)]);
    rig.engine.stop(0);
}

#[tokio::test(flavor = "multi_thread")]
async fn bad_wire_record_is_skipped_not_fatal() {
    let rig = rig();
    let (components, mut wires) = records();

    // A second record pointing at a component that never existed.
    wires.push(WireRecord {
        id: WireId::new(),
        output_component: ComponentId::new(),
        output_name: "reading".into(),
        input_component: components[1].id,
        input_name: "command".into(),
        wireload: None,
    });

    let (restored_components, restored_wires) = rig.engine.restore(&components, &wires).await;
    assert_eq!(restored_components, 2);
    assert_eq!(restored_wires, 1);
    assert_eq!(rig.engine.wire_count(), 1);
    rig.engine.stop(0);
}

#[tokio::test(flavor = "multi_thread")]
async fn bad_component_record_is_skipped_not_fatal() {
    let rig = rig();
    let (mut components, wires) = records();
    components.push(ComponentRecord {
        template_name: "hologram".into(),
        id: ComponentId::new(),
    });

    let (restored_components, restored_wires) = rig.engine.restore(&components, &wires).await;
    assert_eq!(restored_components, 2);
    assert_eq!(restored_wires, 1);
    rig.engine.stop(0);
}

fn valid_formula() -> Formula {
    Formula {
        wires: vec![FormulaWire {
            output_slot: OutputSlot {
                component: "sensor".into(),
                output: NamedInterface {
                    name: "reading".into(),
                },
            },
            input_sink: InputSink {
                component: "actuator".into(),
                input: NamedInterface {
                    name: "command".into(),
                },
            },
            wireload: None,
        }],
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn formula_instantiates_and_connects() {
    let rig = rig();
    rig.engine.load_formula(&valid_formula()).await.unwrap();

    assert_eq!(rig.engine.component_count(), 2);
    assert_eq!(rig.engine.wire_count(), 1);
    rig.engine.stop(0);
}

#[tokio::test(flavor = "multi_thread")]
async fn formula_with_unknown_template_aborts_before_connecting() {
    let rig = rig();
    let mut formula = valid_formula();
    formula.wires.push(FormulaWire {
        output_slot: OutputSlot {
            component: "hologram".into(),
            output: NamedInterface {
                name: "beam".into(),
            },
        },
        input_sink: InputSink {
            component: "actuator".into(),
            input: NamedInterface {
                name: "command".into(),
            },
        },
        wireload: None,
    });

    assert!(rig.engine.load_formula(&formula).await.is_err());

    // All-or-nothing: the valid first wire was not applied either.
    assert_eq!(rig.engine.component_count(), 0);
    assert_eq!(rig.engine.wire_count(), 0);
    rig.engine.stop(0);
}

#[tokio::test(flavor = "multi_thread")]
async fn formula_with_unknown_interface_aborts() {
    let rig = rig();
    let mut formula = valid_formula();
    formula.wires[0].output_slot.output.name = "bogus".into();

    assert!(rig.engine.load_formula(&formula).await.is_err());
    assert_eq!(rig.engine.component_count(), 0);
    rig.engine.stop(0);
}

#[tokio::test(flavor = "multi_thread")]
async fn formula_with_unknown_wireload_still_loads_as_pass_through() {
    let rig = rig();
    let mut formula = valid_formula();
    formula.wires[0].wireload = Some(WireLoadRef {
        name: "nonexistent".into(),
    });

    rig.engine.load_formula(&formula).await.unwrap();
    assert_eq!(rig.engine.wire_count(), 1);
    rig.engine.stop(0);
}
