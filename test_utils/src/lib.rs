//! Shared fixtures for the form-suggestions integration tests.

pub mod generator;
pub mod providers;

use std::sync::Arc;

use serde_json::{Value, json};

use form_suggestions::config::SuggestionConfig;
use form_suggestions::suggestions::{
    FetchOutcome, FieldBinding, KeyChord, KeyEvent, KeyOutcome, MemoryInput, SuggestionOrchestrator,
    SuggestionProvider, SuggestionRegistry,
};

pub fn string_schema() -> Value {
    json!({ "type": "string" })
}

/// A string field `property` bound to a focused in-memory input.
pub struct Harness {
    pub registry: Arc<SuggestionRegistry>,
    pub input: Arc<MemoryInput>,
    pub orchestrator: SuggestionOrchestrator,
}

impl Harness {
    pub fn new(property: &str, value: &str, providers: Vec<Arc<dyn SuggestionProvider>>) -> Self {
        Self::with_config(property, value, providers, SuggestionConfig::default())
    }

    pub fn with_config(
        property: &str,
        value: &str,
        providers: Vec<Arc<dyn SuggestionProvider>>,
        config: SuggestionConfig,
    ) -> Self {
        let registry = Arc::new(SuggestionRegistry::new());
        for provider in providers {
            registry.register(provider);
        }

        let input = Arc::new(MemoryInput::new(value));
        let orchestrator = SuggestionOrchestrator::new(
            FieldBinding::new(property, Some(string_schema())),
            input.clone(),
            registry.clone(),
            config,
        );

        Self {
            registry,
            input,
            orchestrator,
        }
    }

    /// Presses Ctrl+Space in the input and waits for the fetch.
    pub async fn activate(&self) -> FetchOutcome {
        match self.orchestrator.handle_input_key(&KeyChord::ctrl_space().into()) {
            KeyOutcome::Opened(ticket) => ticket.wait().await,
            other => panic!("activation did not open the panel: {:?}", other),
        }
    }

    pub fn panel_key(&self, event: KeyEvent) -> KeyOutcome {
        self.orchestrator.handle_panel_key(&event)
    }
}
