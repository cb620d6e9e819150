//! Splicing a chosen suggestion into a field value

use serde::Serialize;

use super::cursor::locate;
use super::model::{FieldValue, Suggestion};

/// Result of applying a suggestion: the new field text and caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub new_value: String,
    /// Char offset directly after the inserted text.
    pub new_caret: usize,
}

/// Replaces the word around `caret` with `suggestion.value`.
///
/// Only the span of the word is used; its text is not compared against the
/// suggestion, so other occurrences of the same word stay untouched.
pub fn apply_suggestion(suggestion: &Suggestion, current: &str, caret: Option<usize>) -> Applied {
    let span = locate(current, caret);

    let mut new_value: String = current.chars().take(span.start).collect();
    new_value.push_str(&suggestion.value);
    new_value.extend(current.chars().skip(span.end));

    Applied {
        new_value,
        new_caret: span.start + suggestion.value.chars().count(),
    }
}

/// [`apply_suggestion`] over a bound field value.
pub fn apply_to_value(suggestion: &Suggestion, current: &FieldValue, caret: Option<usize>) -> Applied {
    apply_suggestion(suggestion, &current.as_text(), caret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(new_value: &str, new_caret: usize) -> Applied {
        Applied {
            new_value: new_value.to_string(),
            new_caret,
        }
    }

    #[test]
    fn test_replaces_single_word() {
        let result = apply_suggestion(&Suggestion::new("{{prop}}"), "prop", Some(4));
        assert_eq!(result, applied("{{prop}}", 8));
    }

    #[test]
    fn test_replaces_last_word_in_sentence() {
        let result = apply_suggestion(&Suggestion::new("{{prop}}"), "prop1 prop2 prop", Some(16));
        assert_eq!(result, applied("prop1 prop2 {{prop}}", 20));
    }

    #[test]
    fn test_inserts_after_trailing_space() {
        let result = apply_suggestion(&Suggestion::new("suggestion"), "prop1 prop2 ", Some(12));
        assert_eq!(result, applied("prop1 prop2 suggestion", 22));
    }

    #[test]
    fn test_replaces_word_when_caret_in_middle() {
        let result = apply_suggestion(&Suggestion::new("suggestion"), "prop1 prop2", Some(8));
        assert_eq!(result, applied("prop1 suggestion", 16));
    }

    #[test]
    fn test_inserts_into_empty_value() {
        let result = apply_suggestion(&Suggestion::new("foo"), "", Some(0));
        assert_eq!(result, applied("foo", 3));
    }

    #[test]
    fn test_replaces_only_word_under_caret() {
        let result = apply_suggestion(&Suggestion::new("bar"), "foo baz foo", Some(1));
        assert_eq!(result, applied("bar baz foo", 3));
    }

    #[test]
    fn test_appends_when_caret_after_last_char() {
        let result = apply_suggestion(&Suggestion::new("bar"), "foo ", Some(4));
        assert_eq!(result, applied("foo bar", 7));
    }

    #[test]
    fn test_numeric_value_is_replaced_as_text() {
        let result = apply_to_value(&Suggestion::new("{{port}}"), &FieldValue::from(8080i64), Some(2));
        assert_eq!(result, applied("{{port}}", 8));
    }

    #[test]
    fn test_caret_counts_chars_not_bytes() {
        let result = apply_suggestion(&Suggestion::new("ünïcode"), "a b", Some(3));
        assert_eq!(result, applied("a ünïcode", 9));
    }
}
