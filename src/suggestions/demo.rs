//! Demo providers for Camel-style expression fields
//!
//! Three providers serve every `"type": "string"` field:
//!
//! - property placeholders (`RAW(x)`, `{{x}}`, `{{x:default}}` and the
//!   "Property references" group)
//! - simple-language expressions (`${body}`, `${header.x}`, `${variable.x}`)
//! - SQL syntax, the simple-language set prefixed with `#`, answered
//!   asynchronously
//!
//! An empty word is replaced by `foo` so the panel always has something to
//! show.

use std::sync::Arc;

use serde_json::Value;

use super::model::{Suggestion, SuggestionContext, schema_type};
use super::provider::SuggestionProvider;
use super::registry::SuggestionRegistry;
use crate::error::ProviderError;

pub const PROPERTIES_PROVIDER_ID: &str = "demo-properties-suggestion-provider";
pub const SIMPLE_LANGUAGE_PROVIDER_ID: &str = "demo-simple-language-suggestion-provider";
pub const SQL_SYNTAX_PROVIDER_ID: &str = "demo-sql-syntax-suggestion-provider";

const PLACEHOLDER_WORD: &str = "foo";

fn word_or_placeholder(word: &str) -> &str {
    if word.is_empty() { PLACEHOLDER_WORD } else { word }
}

fn serves_strings(schema: &Value) -> bool {
    schema_type(schema) == Some("string")
}

/// Property placeholder syntax.
#[derive(Debug, Default)]
pub struct PropertiesProvider;

impl PropertiesProvider {
    fn build(word: &str) -> Vec<Suggestion> {
        const GROUP: &str = "Property references";

        vec![
            Suggestion::new(format!("RAW({})", word))
                .with_description(format!("Use '{}' as raw value", word)),
            Suggestion::new(format!("{{{{{}}}}}", word))
                .with_description(format!("Use '{}' as a property reference", word)),
            Suggestion::new(format!("{{{{{}:default}}}}", word))
                .with_description(format!("Use '{}' with a default value as a property reference", word)),
            Suggestion::new(format!("{{{{?{}}}}}", word))
                .with_description(format!("Use '{}' as an optional property reference", word))
                .with_group(GROUP),
            Suggestion::new(format!("{{{{!{}}}}}", word))
                .with_description(format!("Use '{}' as a negated property reference", word))
                .with_group(GROUP),
            Suggestion::new(format!("{{{{env:{}}}}}", word))
                .with_description(format!("Use '{}' as an environment variable reference", word))
                .with_group(GROUP),
            Suggestion::new(format!("{{{{sys:{}}}}}", word))
                .with_description(format!("Use '{}' as a system variable reference", word))
                .with_group(GROUP),
        ]
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for PropertiesProvider {
    fn id(&self) -> &str {
        PROPERTIES_PROVIDER_ID
    }

    fn applies_to(&self, _property_name: &str, schema: &Value) -> bool {
        serves_strings(schema)
    }

    async fn suggestions(
        &self,
        word: &str,
        _context: &SuggestionContext,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        Ok(Self::build(word_or_placeholder(word)))
    }
}

/// Simple-language message expressions.
#[derive(Debug, Default)]
pub struct SimpleLanguageProvider;

impl SimpleLanguageProvider {
    fn build(word: &str) -> Vec<Suggestion> {
        const GROUP: &str = "Simple Language";

        vec![
            Suggestion::new("${body}")
                .with_description("Use the body of the message")
                .with_group(GROUP),
            Suggestion::new(format!("${{header.{}}}", word))
                .with_description(format!("Use the '{}' header of the message", word))
                .with_group(GROUP),
            Suggestion::new(format!("${{variable.{}}}", word))
                .with_description(format!("Use the '{}' variable of the message", word))
                .with_group(GROUP),
        ]
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for SimpleLanguageProvider {
    fn id(&self) -> &str {
        SIMPLE_LANGUAGE_PROVIDER_ID
    }

    fn applies_to(&self, _property_name: &str, schema: &Value) -> bool {
        serves_strings(schema)
    }

    async fn suggestions(
        &self,
        word: &str,
        _context: &SuggestionContext,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        Ok(Self::build(word_or_placeholder(word)))
    }
}

/// SQL variants of the simple-language expressions.
#[derive(Debug, Default)]
pub struct SqlSyntaxProvider {
    base: SimpleLanguageProvider,
}

#[async_trait::async_trait]
impl SuggestionProvider for SqlSyntaxProvider {
    fn id(&self) -> &str {
        SQL_SYNTAX_PROVIDER_ID
    }

    fn applies_to(&self, property_name: &str, schema: &Value) -> bool {
        self.base.applies_to(property_name, schema)
    }

    async fn suggestions(
        &self,
        word: &str,
        context: &SuggestionContext,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        // Resolves on a later poll, like a remote lookup would.
        tokio::task::yield_now().await;

        let base = self.base.suggestions(word, context).await?;
        Ok(base
            .into_iter()
            .map(|suggestion| Suggestion {
                value: format!("#{}", suggestion.value),
                description: Some(format!("SQL: {}", suggestion.description.unwrap_or_default())),
                group: Some("SQL Syntax".to_string()),
            })
            .collect())
    }
}

/// Registers the three demo providers in their canonical order.
pub fn register_demo_providers(registry: &SuggestionRegistry) {
    registry.register(Arc::new(PropertiesProvider));
    registry.register(Arc::new(SimpleLanguageProvider));
    registry.register(Arc::new(SqlSyntaxProvider::default()));
}

/// Unregisters every demo provider.
pub fn unregister_demo_providers(registry: &SuggestionRegistry) {
    for id in [PROPERTIES_PROVIDER_ID, SIMPLE_LANGUAGE_PROVIDER_ID, SQL_SYNTAX_PROVIDER_ID] {
        registry.unregister(id);
    }
}
