use std::sync::Arc;

use crate::config::Settings;
use crate::template::{
    ContentValidator, MemoryTemplateStore, PlaceholderValidator, StoreLimits, TemplateRegistry,
    TemplateStore,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: TemplateRegistry,
}

impl AppState {
    /// Build state backed by the in-memory store and the placeholder renderer
    pub fn new(settings: Settings) -> Self {
        let store: Arc<dyn TemplateStore> =
            Arc::new(MemoryTemplateStore::new(StoreLimits::from(&settings.store)));
        let validator: Arc<dyn ContentValidator> = Arc::new(PlaceholderValidator::new());

        Self::with_registry(settings, TemplateRegistry::new(store, validator))
    }

    /// Build state around an existing registry, e.g. one with a fake store
    pub fn with_registry(settings: Settings, registry: TemplateRegistry) -> Self {
        Self {
            settings: Arc::new(settings),
            registry,
        }
    }
}
