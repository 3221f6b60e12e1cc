//! Components: named instantiations of templates.

use super::interface::{Input, Output};
use crate::error::RuntimeError;
use crate::template::ComponentTemplate;
use parking_lot::RwLock;
use patchbay_provider::ProviderRegistry;
use patchbay_types::{Attributes, ComponentId};
use serde_json::Value;
use std::collections::HashMap;

/// A node in the dataflow graph.
///
/// Instantiated from an immutable [`ComponentTemplate`]: every
/// instance gets fresh owned interfaces built from the template's
/// declarative fields, never shared state. The component holds its
/// interfaces; the wires attached to them are owned by the engine's
/// wire registry (interfaces keep shared handles for traversal only).
pub struct Component {
    id: ComponentId,
    template_name: String,
    attrs: RwLock<Attributes>,
    inputs: HashMap<String, Input>,
    outputs: HashMap<String, Output>,
}

impl Component {
    /// Builds a component from a template, resolving one provider per
    /// interface protocol.
    ///
    /// `id` is honored when given (restore path); otherwise a fresh id
    /// is generated.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Provider`] when an interface's protocol has no
    /// registered provider.
    pub(crate) fn from_template(
        template: &ComponentTemplate,
        id: Option<ComponentId>,
        providers: &ProviderRegistry,
    ) -> Result<Self, RuntimeError> {
        let id = id.unwrap_or_else(ComponentId::new);

        let mut inputs = HashMap::new();
        for def in &template.inputs {
            let provider = providers.resolve(&def.protocol.name)?;
            inputs.insert(def.name.clone(), Input::new(id, def, provider));
        }

        let mut outputs = HashMap::new();
        for def in &template.outputs {
            let provider = providers.resolve(&def.protocol.name)?;
            outputs.insert(def.name.clone(), Output::new(id, def, provider));
        }

        Ok(Self {
            id,
            template_name: template.name.clone(),
            attrs: RwLock::new(Attributes::new()),
            inputs,
            outputs,
        })
    }

    /// Component id.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Name of the template this component was instantiated from.
    #[must_use]
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Looks up an input interface by name.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.get(name)
    }

    /// Looks up an output interface by name.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    /// Input interface names, unordered.
    #[must_use]
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.keys().map(String::as_str).collect()
    }

    /// Output interface names, unordered.
    #[must_use]
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.keys().map(String::as_str).collect()
    }

    /// Reads one attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<Value> {
        self.attrs.read().get(key).cloned()
    }

    /// Merges `attrs` into the component's attribute map.
    pub fn set_attrs(&self, attrs: Attributes) {
        self.attrs.write().extend(attrs);
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("template", &self.template_name)
            .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
            .field("outputs", &self.outputs.keys().collect::<Vec<_>>())
            .finish()
    }
}
