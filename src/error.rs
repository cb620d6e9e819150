//! Error types for providers, configuration and key chord parsing.
//!
//! None of these cross the orchestrator's public contract: provider errors
//! are absorbed per fetch, and configuration errors only surface while a
//! host is being set up.

use thiserror::Error;

/// Failure reported by a [`SuggestionProvider`](crate::suggestions::SuggestionProvider).
///
/// The orchestrator treats every variant the same way: the failing provider
/// contributes no suggestions to the current fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider failed: {0}")]
    Failed(String),

    #[error("provider backend unavailable: {0}")]
    Unavailable(String),

    #[error("provider '{id}' timed out after {after_ms}ms")]
    Timeout { id: String, after_ms: u64 },
}

/// A key chord string such as `"ctrl+space"` could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("empty key chord")]
    Empty,

    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("unknown key '{0}'")]
    UnknownKey(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid key chord in {source_name}: {error}")]
    Chord {
        source_name: String,
        #[source]
        error: KeyParseError,
    },

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
