//! Identifier types for the patchbay graph.
//!
//! All identifiers are UUID-based so they stay collision-resistant
//! across process restarts and can round-trip through an external
//! store unchanged.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a [`Component`] in the dataflow graph.
///
/// A Component is a named instantiation of a component template: a
/// node owning input and output interfaces. Each instance gets a
/// random UUID v4 unless it is being restored from a persisted record,
/// in which case the stored UUID is reused via [`from_uuid`].
///
/// [`Component`]: https://docs.rs/patchbay-runtime
/// [`from_uuid`]: Self::from_uuid
///
/// # Example
///
/// ```
/// use patchbay_types::ComponentId;
///
/// let a = ComponentId::new();
/// let b = ComponentId::new();
/// assert_ne!(a, b);
///
/// // Restoring keeps the identity stable
/// let restored = ComponentId::from_uuid(a.uuid());
/// assert_eq!(a, restored);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub Uuid);

#[allow(clippy::new_without_default)] // Default intentionally not implemented - a fresh
// ComponentId that is not registered anywhere invites subtle bugs; construction should
// always be an explicit act.
impl ComponentId {
    /// Creates a new [`ComponentId`] with a random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reconstructs a [`ComponentId`] from a persisted UUID.
    ///
    /// Used when restoring a graph from an external store.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "com:{}", self.0)
    }
}

/// Identifier for a Wire in the dataflow graph.
///
/// A Wire is a directed edge from one Output interface to one Input
/// interface. Like [`ComponentId`], a fresh wire gets a random UUID v4
/// and a restored wire reuses its persisted UUID.
///
/// # Example
///
/// ```
/// use patchbay_types::WireId;
///
/// let id = WireId::new();
/// assert_eq!(id, WireId::from_uuid(id.uuid()));
/// println!("connected {id}");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireId(pub Uuid);

#[allow(clippy::new_without_default)] // Default intentionally not implemented - see ComponentId.
impl WireId {
    /// Creates a new [`WireId`] with a random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reconstructs a [`WireId`] from a persisted UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "wire:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_ids_are_unique() {
        let a = ComponentId::new();
        let b = ComponentId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn component_id_restores_from_uuid() {
        let original = ComponentId::new();
        let restored = ComponentId::from_uuid(original.uuid());
        assert_eq!(original, restored);
    }

    #[test]
    fn wire_ids_are_unique() {
        assert_ne!(WireId::new(), WireId::new());
    }

    #[test]
    fn display_prefixes() {
        let com = ComponentId::new();
        let wire = WireId::new();
        assert!(com.to_string().starts_with("com:"));
        assert!(wire.to_string().starts_with("wire:"));
    }

    #[test]
    fn ids_serde_round_trip() {
        let com = ComponentId::new();
        let json = serde_json::to_string(&com).unwrap();
        let back: ComponentId = serde_json::from_str(&json).unwrap();
        assert_eq!(com, back);

        let wire = WireId::new();
        let json = serde_json::to_string(&wire).unwrap();
        let back: WireId = serde_json::from_str(&json).unwrap();
        assert_eq!(wire, back);
    }

    #[test]
    fn ids_usable_as_map_keys() {
        use std::collections::HashMap;

        let id = WireId::new();
        let mut map = HashMap::new();
        map.insert(id, "wire");
        assert_eq!(map.get(&id), Some(&"wire"));
    }
}
