//! Abstract rendering contract for the suggestion panel
//!
//! The panel is a flat list of rows: `root` suggestions first, then one
//! expandable row per named group. When nothing matched, a single disabled
//! placeholder row stands in for the list. Hosts render these rows however
//! they like; [`PanelFocus`] tracks keyboard position within them.

use serde::Serialize;

use super::model::{GroupedSuggestions, Suggestion};

pub const NO_SUGGESTIONS_LABEL: &str = "No suggestions available";

/// One row of the suggestion panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuEntry {
    /// Directly selectable `root` suggestion.
    Suggestion { suggestion: Suggestion },

    /// Expandable node holding the members of a named group.
    Group {
        label: String,
        suggestions: Vec<Suggestion>,
    },

    /// Disabled row shown when there are no suggestions at all.
    Placeholder { label: String },
}

impl MenuEntry {
    pub fn is_navigable(&self) -> bool {
        !matches!(self, MenuEntry::Placeholder { .. })
    }

    pub fn label(&self) -> &str {
        match self {
            MenuEntry::Suggestion { suggestion } => &suggestion.value,
            MenuEntry::Group { label, .. } | MenuEntry::Placeholder { label } => label,
        }
    }
}

/// Builds panel rows from grouped suggestions.
pub fn build_entries(grouped: &GroupedSuggestions, placeholder: &str) -> Vec<MenuEntry> {
    let mut entries: Vec<MenuEntry> = grouped
        .root()
        .iter()
        .cloned()
        .map(|suggestion| MenuEntry::Suggestion { suggestion })
        .collect();

    entries.extend(
        grouped
            .groups()
            .filter(|(_, members)| !members.is_empty())
            .map(|(label, members)| MenuEntry::Group {
                label: label.to_string(),
                suggestions: members.to_vec(),
            }),
    );

    if entries.is_empty() {
        entries.push(MenuEntry::Placeholder {
            label: placeholder.to_string(),
        });
    }

    entries
}

/// Where keyboard focus sits while the panel is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "at", rename_all = "snake_case")]
pub enum PanelFocus {
    /// The embedded filter box.
    Search,
    /// A top-level row.
    Row { index: usize },
    /// A member inside an expanded group row.
    Child { row: usize, index: usize },
}

/// Direction of a navigation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Into,
    Out,
}

/// Initial focus for a freshly opened panel.
pub fn initial_focus(search_box: bool) -> PanelFocus {
    if search_box {
        PanelFocus::Search
    } else {
        PanelFocus::Row { index: 0 }
    }
}

fn navigable_rows(entries: &[MenuEntry]) -> usize {
    entries.iter().filter(|entry| entry.is_navigable()).count()
}

fn group_len(entries: &[MenuEntry], row: usize) -> Option<usize> {
    match entries.get(row) {
        Some(MenuEntry::Group { suggestions, .. }) => Some(suggestions.len()),
        _ => None,
    }
}

/// Applies one navigation step. Movement stops at the edges.
pub fn navigate(focus: PanelFocus, entries: &[MenuEntry], step: Move, search_box: bool) -> PanelFocus {
    let rows = navigable_rows(entries);

    match (focus, step) {
        (PanelFocus::Search, Move::Down) if rows > 0 => PanelFocus::Row { index: 0 },
        (PanelFocus::Search, _) => PanelFocus::Search,

        (PanelFocus::Row { index }, Move::Down) if index + 1 < rows => PanelFocus::Row { index: index + 1 },
        (PanelFocus::Row { index: 0 }, Move::Up) if search_box => PanelFocus::Search,
        (PanelFocus::Row { index }, Move::Up) if index > 0 => PanelFocus::Row { index: index - 1 },
        (PanelFocus::Row { index }, Move::Into) => match group_len(entries, index) {
            Some(len) if len > 0 => PanelFocus::Child { row: index, index: 0 },
            _ => focus,
        },
        (PanelFocus::Row { .. }, _) => focus,

        (PanelFocus::Child { row, index }, Move::Down) => match group_len(entries, row) {
            Some(len) if index + 1 < len => PanelFocus::Child { row, index: index + 1 },
            _ => focus,
        },
        (PanelFocus::Child { row, index }, Move::Up) if index > 0 => PanelFocus::Child { row, index: index - 1 },
        (PanelFocus::Child { row, .. }, Move::Out) => PanelFocus::Row { index: row },
        (PanelFocus::Child { .. }, _) => focus,
    }
}

/// Pulls focus back inside the panel after its rows changed.
pub fn clamp_focus(focus: PanelFocus, entries: &[MenuEntry], search_box: bool) -> PanelFocus {
    let fallback = if search_box {
        PanelFocus::Search
    } else {
        PanelFocus::Row { index: 0 }
    };

    match focus {
        PanelFocus::Search => focus,
        PanelFocus::Row { index } if index < navigable_rows(entries) => focus,
        PanelFocus::Child { row, index } => match group_len(entries, row) {
            Some(len) if index < len => focus,
            _ => fallback,
        },
        PanelFocus::Row { .. } => fallback,
    }
}

/// What the focused row represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget<'a> {
    Search,
    Suggestion(&'a Suggestion),
    Group(&'a str),
    Nothing,
}

pub fn focus_target(focus: PanelFocus, entries: &[MenuEntry]) -> FocusTarget<'_> {
    match focus {
        PanelFocus::Search => FocusTarget::Search,
        PanelFocus::Row { index } => match entries.get(index) {
            Some(MenuEntry::Suggestion { suggestion }) => FocusTarget::Suggestion(suggestion),
            Some(MenuEntry::Group { label, .. }) => FocusTarget::Group(label.as_str()),
            _ => FocusTarget::Nothing,
        },
        PanelFocus::Child { row, index } => match entries.get(row) {
            Some(MenuEntry::Group { suggestions, .. }) => suggestions
                .get(index)
                .map_or(FocusTarget::Nothing, FocusTarget::Suggestion),
            _ => FocusTarget::Nothing,
        },
    }
}
