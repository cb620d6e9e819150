//! Host seam for the caret-aware text control an orchestrator is bound to

use parking_lot::Mutex;

use super::model::FieldValue;

/// The text control a [`SuggestionOrchestrator`](super::SuggestionOrchestrator)
/// reads from and writes back to.
///
/// Hosts wire their real widget behind this trait. All methods are called
/// synchronously from the orchestrator and must not block.
pub trait InputHandle: Send + Sync {
    /// Current bound value.
    fn value(&self) -> FieldValue;

    /// Live caret offset in chars, if the control knows it.
    fn caret(&self) -> Option<usize>;

    /// Writes a new value through the field's change handler.
    fn set_value(&self, value: &str);

    /// Moves the caret (after a commit).
    fn set_caret(&self, caret: usize);

    /// Returns keyboard focus to the control.
    fn focus(&self);

    fn has_focus(&self) -> bool;
}

#[derive(Debug, Default)]
struct MemoryState {
    value: String,
    caret: usize,
    focused: bool,
}

/// In-memory text control used by the CLI and tests.
///
/// Typing inserts at the caret; the caret is kept within the value.
#[derive(Debug, Default)]
pub struct MemoryInput {
    state: Mutex<MemoryState>,
}

impl MemoryInput {
    /// A focused input holding `value` with the caret at the end.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let caret = value.chars().count();
        Self {
            state: Mutex::new(MemoryState {
                value,
                caret,
                focused: true,
            }),
        }
    }

    pub fn with_caret(self, caret: usize) -> Self {
        self.set_caret(caret);
        self
    }

    pub fn text(&self) -> String {
        self.state.lock().value.clone()
    }

    pub fn blur(&self) {
        self.state.lock().focused = false;
    }

    /// Inserts `text` at the caret and moves the caret past it.
    pub fn type_text(&self, text: &str) {
        let mut state = self.state.lock();
        let mut value: String = state.value.chars().take(state.caret).collect();
        value.push_str(text);
        value.extend(state.value.chars().skip(state.caret));
        state.value = value;
        state.caret += text.chars().count();
    }

    /// Deletes the char before the caret.
    pub fn backspace(&self) {
        let mut state = self.state.lock();
        if state.caret == 0 {
            return;
        }
        let caret = state.caret;
        state.value = state
            .value
            .chars()
            .enumerate()
            .filter(|(i, _)| *i != caret - 1)
            .map(|(_, c)| c)
            .collect();
        state.caret -= 1;
    }
}

impl InputHandle for MemoryInput {
    fn value(&self) -> FieldValue {
        FieldValue::Text(self.text())
    }

    fn caret(&self) -> Option<usize> {
        Some(self.state.lock().caret)
    }

    fn set_value(&self, value: &str) {
        let mut state = self.state.lock();
        state.value = value.to_string();
        state.caret = state.caret.min(state.value.chars().count());
    }

    fn set_caret(&self, caret: usize) {
        let mut state = self.state.lock();
        state.caret = caret.min(state.value.chars().count());
    }

    fn focus(&self) {
        self.state.lock().focused = true;
    }

    fn has_focus(&self) -> bool {
        self.state.lock().focused
    }
}
