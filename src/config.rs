//! Suggestion panel configuration
//!
//! Defaults reproduce the stock behaviour (both `ctrl+space` and
//! `alt+escape` open the panel, no provider timeout, filter box enabled).
//! A JSON file and environment variables can override them:
//!
//! ```json
//! {
//!   "activation": ["ctrl+space"],
//!   "provider_timeout_ms": 1500,
//!   "search_box": true,
//!   "placeholder": "No suggestions available"
//! }
//! ```
//!
//! | Variable                           | Field                 |
//! |------------------------------------|-----------------------|
//! | `FORM_SUGGEST_ACTIVATION`          | `activation` (comma-separated chords) |
//! | `FORM_SUGGEST_PROVIDER_TIMEOUT_MS` | `provider_timeout_ms` (`0` disables) |
//! | `FORM_SUGGEST_SEARCH_BOX`          | `search_box` (`true`/`false`) |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::suggestions::keys::{KeyChord, parse_chord_list};
use crate::suggestions::menu::NO_SUGGESTIONS_LABEL;

pub const ENV_ACTIVATION: &str = "FORM_SUGGEST_ACTIVATION";
pub const ENV_PROVIDER_TIMEOUT_MS: &str = "FORM_SUGGEST_PROVIDER_TIMEOUT_MS";
pub const ENV_SEARCH_BOX: &str = "FORM_SUGGEST_SEARCH_BOX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestionConfig {
    /// Chords that open the panel while the input has focus.
    pub activation: Vec<KeyChord>,

    /// Upper bound for a single provider call. `None` waits indefinitely;
    /// a hung provider then only withholds its own suggestions.
    pub provider_timeout_ms: Option<u64>,

    /// Whether the panel embeds a filter box that receives focus on open.
    pub search_box: bool,

    /// Label of the disabled row shown when nothing matched.
    pub placeholder: String,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            activation: vec![KeyChord::ctrl_space(), KeyChord::alt_escape()],
            provider_timeout_ms: None,
            search_box: true,
            placeholder: NO_SUGGESTIONS_LABEL.to_string(),
        }
    }
}

impl SuggestionConfig {
    /// Reads a JSON configuration file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: SuggestionConfig = serde_json::from_str(&text)?;
        debug!("Loaded suggestion config from {}", path.display());
        Ok(config)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup(ENV_ACTIVATION) {
            self.activation = parse_chord_list(&list).map_err(|error| ConfigError::Chord {
                source_name: ENV_ACTIVATION.to_string(),
                error,
            })?;
        }

        if let Some(raw) = lookup(ENV_PROVIDER_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_PROVIDER_TIMEOUT_MS.to_string(),
                value: raw.clone(),
            })?;
            self.provider_timeout_ms = (ms > 0).then_some(ms);
        }

        if let Some(raw) = lookup(ENV_SEARCH_BOX) {
            self.search_box = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_SEARCH_BOX.to_string(),
                        value: raw,
                    });
                }
            };
        }

        Ok(self)
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_accept_both_chords() {
        let config = SuggestionConfig::default();
        assert_eq!(config.activation, vec![KeyChord::ctrl_space(), KeyChord::alt_escape()]);
        assert_eq!(config.provider_timeout(), None);
        assert!(config.search_box);
    }

    #[test]
    fn test_env_overrides() {
        let config = SuggestionConfig::default()
            .with_overrides(lookup(&[
                (ENV_ACTIVATION, "ctrl+space"),
                (ENV_PROVIDER_TIMEOUT_MS, "250"),
                (ENV_SEARCH_BOX, "off"),
            ]))
            .unwrap();

        assert_eq!(config.activation, vec![KeyChord::ctrl_space()]);
        assert_eq!(config.provider_timeout(), Some(Duration::from_millis(250)));
        assert!(!config.search_box);
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = SuggestionConfig::default()
            .with_overrides(lookup(&[(ENV_PROVIDER_TIMEOUT_MS, "0")]))
            .unwrap();
        assert_eq!(config.provider_timeout_ms, None);
    }

    #[test]
    fn test_invalid_env_values_are_errors() {
        let result = SuggestionConfig::default().with_overrides(lookup(&[(ENV_ACTIVATION, "ctrl+nope")]));
        assert!(matches!(result, Err(ConfigError::Chord { .. })));

        let result = SuggestionConfig::default().with_overrides(lookup(&[(ENV_SEARCH_BOX, "maybe")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SuggestionConfig = serde_json::from_str(r#"{ "activation": ["alt+escape"] }"#).unwrap();
        assert_eq!(config.activation, vec![KeyChord::alt_escape()]);
        assert!(config.search_box);
        assert_eq!(config.placeholder, NO_SUGGESTIONS_LABEL);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<SuggestionConfig, _> = serde_json::from_str(r#"{ "colour": "blue" }"#);
        assert!(result.is_err());
    }
}
