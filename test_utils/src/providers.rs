//! Scriptable suggestion providers for orchestrator tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::trace;

use form_suggestions::error::ProviderError;
use form_suggestions::suggestions::model::schema_type;
use form_suggestions::suggestions::{Suggestion, SuggestionContext, SuggestionProvider};

fn type_matches(required: Option<&str>, schema: &Value) -> bool {
    required.is_none_or(|required| schema_type(schema) == Some(required))
}

/// Returns a fixed list and records every call.
pub struct StaticProvider {
    id: String,
    suggestions: Vec<Suggestion>,
    schema_type: Option<String>,
    calls: AtomicUsize,
    words: Mutex<Vec<String>>,
}

impl StaticProvider {
    /// Serves every field.
    pub fn new(id: &str, suggestions: Vec<Suggestion>) -> Self {
        Self {
            id: id.to_string(),
            suggestions,
            schema_type: None,
            calls: AtomicUsize::new(0),
            words: Mutex::new(Vec::new()),
        }
    }

    /// Restricts the provider to fields whose schema `type` is `ty`.
    pub fn for_type(mut self, ty: &str) -> Self {
        self.schema_type = Some(ty.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Words received so far, in call order.
    pub fn words(&self) -> Vec<String> {
        self.words.lock().clone()
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for StaticProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn applies_to(&self, _property_name: &str, schema: &Value) -> bool {
        type_matches(self.schema_type.as_deref(), schema)
    }

    async fn suggestions(
        &self,
        word: &str,
        _context: &SuggestionContext,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.words.lock().push(word.to_string());
        Ok(self.suggestions.clone())
    }
}

/// Echoes the word as `"<id>:<word>"`.
///
/// Calls for gated words wait until [`GatedProvider::release`] hands out a
/// permit, which lets a test decide the order in which fetches resolve.
pub struct GatedProvider {
    id: String,
    gated: Mutex<HashSet<String>>,
    gate: Semaphore,
    calls: AtomicUsize,
}

impl GatedProvider {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            gated: Mutex::new(HashSet::new()),
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Holds back calls whose word is `word`.
    pub fn gate_word(self, word: &str) -> Self {
        self.gated.lock().insert(word.to_string());
        self
    }

    /// Lets `n` held-back calls finish.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn echo(&self, word: &str) -> Suggestion {
        Suggestion::new(format!("{}:{}", self.id, word))
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for GatedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn applies_to(&self, _property_name: &str, _schema: &Value) -> bool {
        true
    }

    async fn suggestions(
        &self,
        word: &str,
        _context: &SuggestionContext,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let held = self.gated.lock().contains(word);
        if held {
            trace!("Provider '{}' holding word '{}'", self.id, word);
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
            permit.forget();
        }

        Ok(vec![self.echo(word)])
    }
}

/// Always fails with [`ProviderError::Failed`].
pub struct FailingProvider {
    id: String,
}

impl FailingProvider {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for FailingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn applies_to(&self, _property_name: &str, _schema: &Value) -> bool {
        true
    }

    async fn suggestions(
        &self,
        _word: &str,
        _context: &SuggestionContext,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        Err(ProviderError::Failed(format!("{} is broken", self.id)))
    }
}

/// Panics inside its future.
pub struct PanickingProvider {
    id: String,
}

impl PanickingProvider {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for PanickingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn applies_to(&self, _property_name: &str, _schema: &Value) -> bool {
        true
    }

    async fn suggestions(
        &self,
        _word: &str,
        _context: &SuggestionContext,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        panic!("{} exploded", self.id)
    }
}

/// Never resolves.
pub struct PendingProvider {
    id: String,
}

impl PendingProvider {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for PendingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn applies_to(&self, _property_name: &str, _schema: &Value) -> bool {
        true
    }

    async fn suggestions(
        &self,
        _word: &str,
        _context: &SuggestionContext,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        std::future::pending().await
    }
}
