//! Word detection at a caret position
//!
//! A word is a run of characters delimited by the ASCII space (U+0020) only;
//! tabs and newlines are part of words. Offsets are counted in `char`s.

use serde::Serialize;

use super::model::FieldValue;

const SPACE: char = ' ';

/// The word under (or directly adjacent to) the caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorWord {
    pub word: String,
    /// First char of the word.
    pub start: usize,
    /// One past the last char of the word.
    pub end: usize,
}

/// Converts a host caret that may be negative into a clamped offset.
pub fn caret_from_signed(caret: i64) -> usize {
    usize::try_from(caret).unwrap_or(0)
}

/// Finds the word around `caret` in `value`.
///
/// A missing caret counts as offset 0 and a caret past the end is clamped to
/// the end. The span satisfies `start <= caret <= end` after clamping, and is
/// empty (`start == end == caret`) when the caret sits between two spaces or
/// after a trailing space.
pub fn locate(value: &str, caret: Option<usize>) -> CursorWord {
    let requested = caret.unwrap_or(0);
    let (caret_byte, caret) = match value.char_indices().nth(requested) {
        Some((byte, _)) => (byte, requested),
        None => (value.len(), value.chars().count()),
    };

    let (before, after) = value.split_at(caret_byte);
    let start_byte = before.rfind(SPACE).map_or(0, |i| i + SPACE.len_utf8());
    let end_byte = after.find(SPACE).map_or(value.len(), |i| caret_byte + i);

    CursorWord {
        word: value[start_byte..end_byte].to_string(),
        start: caret - before[start_byte..].chars().count(),
        end: caret + value[caret_byte..end_byte].chars().count(),
    }
}

/// [`locate`] over a bound field value; numbers use their decimal form.
pub fn locate_value(value: &FieldValue, caret: Option<usize>) -> CursorWord {
    locate(&value.as_text(), caret)
}
