//! Pluggable suggestion sources
//!
//! Providers decide for themselves which fields they serve through
//! [`SuggestionProvider::applies_to`], and answer asynchronously. A provider
//! with nothing to await simply returns its result.

use serde_json::Value;

use super::model::{Suggestion, SuggestionContext};
use crate::error::ProviderError;

/// A source of suggestions for a subset of form fields.
///
/// # Thread Safety
///
/// Providers are shared between every orchestrator of a session and called
/// from spawned tasks, so they must be `Send + Sync`.
///
/// # Example
///
/// ```rust,ignore
/// struct EnvProvider;
///
/// #[async_trait::async_trait]
/// impl SuggestionProvider for EnvProvider {
///     fn id(&self) -> &str {
///         "env-provider"
///     }
///
///     fn applies_to(&self, _property_name: &str, schema: &Value) -> bool {
///         schema_type(schema) == Some("string")
///     }
///
///     async fn suggestions(
///         &self,
///         word: &str,
///         _context: &SuggestionContext,
///     ) -> Result<Vec<Suggestion>, ProviderError> {
///         Ok(vec![Suggestion::new(format!("{{{{env:{}}}}}", word))])
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Unique identifier within a registry.
    fn id(&self) -> &str;

    /// Whether this provider serves the field described by `property_name`
    /// and its schema fragment.
    fn applies_to(&self, property_name: &str, schema: &Value) -> bool;

    /// Suggestions for the word under the caret.
    ///
    /// An error only removes this provider's contribution from the current
    /// fetch; other providers are unaffected.
    async fn suggestions(
        &self,
        word: &str,
        context: &SuggestionContext,
    ) -> Result<Vec<Suggestion>, ProviderError>;
}
