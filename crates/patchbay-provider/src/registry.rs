//! Protocol name → shared provider instance resolution.

use crate::{ProviderError, ServiceProvider};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry resolving protocol names to shared provider instances.
///
/// Each protocol is served by exactly one instance for the lifetime of
/// the registry; every interface bound to that protocol receives a
/// clone of the same `Arc`. Registration is **first wins**: a second
/// registration for an already-served protocol is logged and ignored,
/// so a provider resolved early can never be swapped out from under a
/// live interface.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use patchbay_provider::{LogProvider, ProviderRegistry};
///
/// let registry = ProviderRegistry::new();
/// registry.register(Arc::new(LogProvider::new("mqtt")));
///
/// let a = registry.get("mqtt").unwrap();
/// let b = registry.get("mqtt").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn ServiceProvider>>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a provider under its protocol name.
    ///
    /// First registration wins; duplicates are logged and dropped.
    pub fn register(&self, provider: Arc<dyn ServiceProvider>) {
        let protocol = provider.protocol().to_string();
        let mut providers = self.providers.write();
        if providers.contains_key(&protocol) {
            warn!(%protocol, "provider already registered, keeping existing");
            return;
        }
        debug!(%protocol, "provider registered");
        providers.insert(protocol, provider);
    }

    /// Resolves the shared provider instance for `protocol`.
    #[must_use]
    pub fn get(&self, protocol: &str) -> Option<Arc<dyn ServiceProvider>> {
        self.providers.read().get(protocol).cloned()
    }

    /// Like [`get`](Self::get), but converts a miss into
    /// [`ProviderError::UnknownProtocol`].
    pub fn resolve(&self, protocol: &str) -> Result<Arc<dyn ServiceProvider>, ProviderError> {
        self.get(protocol)
            .ok_or_else(|| ProviderError::UnknownProtocol(protocol.to_string()))
    }

    /// Number of registered protocols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    /// Returns `true` if no providers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogProvider;
    use patchbay_types::ErrorCode;

    #[test]
    fn resolves_registered_protocol() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(LogProvider::new("mqtt")));

        assert!(registry.get("mqtt").is_some());
        assert!(registry.get("serial").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn same_instance_for_every_caller() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(LogProvider::new("mqtt")));

        let a = registry.get("mqtt").unwrap();
        let b = registry.get("mqtt").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn first_registration_wins() {
        let registry = ProviderRegistry::new();
        let first: Arc<dyn ServiceProvider> = Arc::new(LogProvider::new("mqtt"));
        registry.register(Arc::clone(&first));
        registry.register(Arc::new(LogProvider::new("mqtt")));

        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get("mqtt").unwrap(), &first));
    }

    #[test]
    fn resolve_miss_is_typed() {
        let registry = ProviderRegistry::new();
        let err = registry.resolve("missing").err().unwrap();
        assert_eq!(err.code(), "PROVIDER_UNKNOWN_PROTOCOL");
    }
}
