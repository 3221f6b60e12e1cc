//! Declarative component templates and persisted graph records.
//!
//! Templates describe what a component looks like - named inputs and
//! outputs, each bound to a protocol - without instantiating anything.
//! Records are what an external store keeps so a live graph can be
//! rebuilt after a restart: the same declarative shape plus stable
//! ids. Both are plain serde types; the serialization format is the
//! caller's concern (the CLI uses YAML).
//!
//! # Template document
//!
//! ```yaml
//! component:
//!   name: camera
//!   outputs:
//!     - name: frame
//!       protocol:
//!         name: mqtt
//!         topic: cam/frame
//! ```

use patchbay_types::{Attributes, ComponentId, WireId};
use serde::{Deserialize, Serialize};

/// Protocol binding of one interface: a protocol name plus whatever
/// protocol-specific attributes the template declares alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolDef {
    /// Protocol name, resolved through the provider registry.
    pub name: String,
    /// Protocol-specific attributes (topic, baud rate, ...).
    #[serde(flatten)]
    pub attrs: Attributes,
}

/// Declaration of one named interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDef {
    /// Interface name, unique per direction within the component.
    pub name: String,
    /// Protocol binding.
    pub protocol: ProtocolDef,
}

/// Immutable declarative description of a component.
///
/// Instantiation deep-copies these fields into fresh owned interfaces;
/// templates are never mutated by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    /// Template name (registry key).
    pub name: String,
    /// Declared input interfaces.
    #[serde(default)]
    pub inputs: Vec<InterfaceDef>,
    /// Declared output interfaces.
    #[serde(default)]
    pub outputs: Vec<InterfaceDef>,
}

/// Root of a template document (`component:` wrapper).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// The template itself.
    pub component: ComponentTemplate,
}

/// Persisted record of a live component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Template the component was instantiated from.
    pub template_name: String,
    /// Stable component id to restore under.
    pub id: ComponentId,
}

/// Persisted record of a live wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    /// Stable wire id to restore under.
    pub id: WireId,
    /// Source component.
    pub output_component: ComponentId,
    /// Output interface name on the source component.
    pub output_name: String,
    /// Destination component.
    pub input_component: ComponentId,
    /// Input interface name on the destination component.
    pub input_name: String,
    /// Optional transform name.
    #[serde(default)]
    pub wireload: Option<String>,
}
