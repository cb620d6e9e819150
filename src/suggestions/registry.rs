//! Registry of suggestion providers
//!
//! One registry is constructed per application/session and shared by every
//! orchestrator through an `Arc`. It is mutated only through
//! [`SuggestionRegistry::register`] and [`SuggestionRegistry::unregister`];
//! fetches only read snapshots.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::model::present_schema;
use super::provider::SuggestionProvider;

/// Ordered set of providers keyed by their unique id.
///
/// # Example
///
/// ```rust,ignore
/// let registry = Arc::new(SuggestionRegistry::new());
/// registry.register(Arc::new(PropertiesProvider));
///
/// let providers = registry.query("timerName", Some(&json!({ "type": "string" })));
/// ```
#[derive(Default)]
pub struct SuggestionRegistry {
    providers: RwLock<Vec<Arc<dyn SuggestionProvider>>>,
}

impl SuggestionRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider unless one with the same id is already registered.
    ///
    /// A duplicate id is logged and ignored; the existing provider stays in
    /// place. Returns `true` if the provider was added.
    pub fn register(&self, provider: Arc<dyn SuggestionProvider>) -> bool {
        let mut providers = self.providers.write();

        if providers.iter().any(|p| p.id() == provider.id()) {
            warn!("Suggestion provider with ID \"{}\" already registered", provider.id());
            return false;
        }

        trace!("Registering suggestion provider: {}", provider.id());
        providers.push(provider);

        debug!("Registered suggestion provider (total: {})", providers.len());
        true
    }

    /// Removes the provider with `id`.
    ///
    /// Returns `true` if a provider was removed, `false` if not found.
    pub fn unregister(&self, id: &str) -> bool {
        let mut providers = self.providers.write();
        let initial_len = providers.len();
        providers.retain(|p| p.id() != id);
        let removed = providers.len() < initial_len;

        if removed {
            debug!("Unregistered suggestion provider '{}'", id);
        } else {
            trace!("Suggestion provider '{}' not found for unregistration", id);
        }

        removed
    }

    /// Providers serving `property_name`, in registration order.
    ///
    /// A missing or `null` schema skips the `applies_to` filter entirely and
    /// returns every registered provider.
    pub fn query(&self, property_name: &str, schema: Option<&Value>) -> Vec<Arc<dyn SuggestionProvider>> {
        let providers = self.providers.read();

        let Some(schema) = present_schema(schema) else {
            return providers.clone();
        };

        providers
            .iter()
            .filter(|p| p.applies_to(property_name, schema))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn SuggestionProvider>> {
        self.providers.read().iter().find(|p| p.id() == id).cloned()
    }

    /// Returns the number of registered providers
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    /// Returns `true` if no providers are registered
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// Ids of all registered providers in registration order
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.read().iter().map(|p| p.id().to_string()).collect()
    }
}
