//! Bulk wiring definitions ("formulas").
//!
//! A formula lists wire specifications that each implicitly
//! instantiate their endpoint components by template name and then
//! connect them. Application is all-or-nothing by design: a half-wired
//! formula is worse than none, so any defect aborts the whole load
//! before a single wire is connected.
//!
//! # Formula document
//!
//! ```yaml
//! wires:
//!   - output_slot:
//!       component: camera
//!       output:
//!         name: frame
//!     input_sink:
//!       component: display
//!       input:
//!         name: image
//!     wireload:
//!       name: threshold
//! ```

use serde::{Deserialize, Serialize};

/// Reference to an interface by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedInterface {
    /// Interface name.
    pub name: String,
}

/// Source side of a formula wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSlot {
    /// Template name of the source component.
    pub component: String,
    /// Output interface on that component.
    pub output: NamedInterface,
}

/// Destination side of a formula wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSink {
    /// Template name of the destination component.
    pub component: String,
    /// Input interface on that component.
    pub input: NamedInterface,
}

/// Optional transform reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireLoadRef {
    /// Registered transform name.
    pub name: String,
}

/// One wire specification in a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaWire {
    /// Source endpoint.
    pub output_slot: OutputSlot,
    /// Destination endpoint.
    pub input_sink: InputSink,
    /// Optional transform.
    #[serde(default)]
    pub wireload: Option<WireLoadRef>,
}

/// A bulk wiring definition.
///
/// Every field of every wire is required (except the transform);
/// deserialization already rejects documents with missing names, and
/// [`PatchbayEngine::load_formula`](crate::PatchbayEngine::load_formula)
/// validates template and interface references before touching the
/// graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    /// Wire specifications, applied in order.
    pub wires: Vec<FormulaWire>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_parses_from_yaml() {
        let yaml = r#"
wires:
  - output_slot:
      component: camera
      output:
        name: frame
    input_sink:
      component: display
      input:
        name: image
    wireload:
      name: threshold
  - output_slot:
      component: camera
      output:
        name: frame
    input_sink:
      component: recorder
      input:
        name: stream
"#;
        let formula: Formula = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(formula.wires.len(), 2);
        assert_eq!(formula.wires[0].output_slot.component, "camera");
        assert_eq!(
            formula.wires[0].wireload.as_ref().unwrap().name,
            "threshold"
        );
        assert!(formula.wires[1].wireload.is_none());
    }

    #[test]
    fn missing_output_name_is_rejected_at_parse_time() {
        let yaml = r#"
wires:
  - output_slot:
      component: camera
      output: {}
    input_sink:
      component: display
      input:
        name: image
"#;
        assert!(serde_yaml::from_str::<Formula>(yaml).is_err());
    }

    #[test]
    fn missing_input_sink_is_rejected_at_parse_time() {
        let yaml = r#"
wires:
  - output_slot:
      component: camera
      output:
        name: frame
"#;
        assert!(serde_yaml::from_str::<Formula>(yaml).is_err());
    }
}
