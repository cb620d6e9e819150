//! Schema-driven suggestions for form text inputs
//!
//! This module provides:
//! - Word-under-caret extraction and suggestion insertion
//! - A registry of pluggable, asynchronous suggestion providers
//! - A per-input orchestrator that opens a grouped, filterable panel on an
//!   activation chord and writes the chosen suggestion back
//!
//! # Architecture
//!
//! ```text
//! KeyEvent ──▶ SuggestionOrchestrator ──▶ SuggestionRegistry::query
//!                  │      ▲                      │
//!                  │      └── publish ◀── providers (concurrent)
//!                  ▼
//!        entries() / commit() ──▶ InputHandle
//! ```

pub mod apply;
pub mod cursor;
pub mod demo;
pub mod input;
pub mod keys;
pub mod menu;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod registry;

pub use apply::{Applied, apply_suggestion, apply_to_value};
pub use cursor::{CursorWord, caret_from_signed, locate, locate_value};
pub use demo::register_demo_providers;
pub use input::{InputHandle, MemoryInput};
pub use keys::{Key, KeyChord, KeyEvent, Modifiers, parse_chord_list};
pub use menu::{MenuEntry, NO_SUGGESTIONS_LABEL, PanelFocus};
pub use model::{
    FieldBinding, FieldValue, GroupedSuggestions, ROOT_GROUP, Suggestion, SuggestionContext,
    filter_suggestions,
};
pub use orchestrator::{
    FetchOutcome, FetchTicket, KeyOutcome, PanelSnapshot, PanelStatus, SuggestionOrchestrator,
};
pub use provider::SuggestionProvider;
pub use registry::SuggestionRegistry;
