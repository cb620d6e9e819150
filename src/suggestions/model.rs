//! Core data types shared by providers, the registry and the orchestrator.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Name of the reserved bucket holding ungrouped suggestions.
pub const ROOT_GROUP: &str = "root";

/// A candidate replacement for the word under the caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Literal text inserted into the field.
    pub value: String,

    /// Human-readable explanation, shown next to the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Named bucket; `None` places the suggestion in [`ROOT_GROUP`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Suggestion {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
            group: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Bucket this suggestion belongs to.
    pub fn group_name(&self) -> &str {
        self.group.as_deref().unwrap_or(ROOT_GROUP)
    }
}

/// The value bound to a field: free text or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
}

impl FieldValue {
    /// Decimal/text form used for all caret arithmetic.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => number.to_string(),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<serde_json::Number> for FieldValue {
    fn from(value: serde_json::Number) -> Self {
        FieldValue::Number(value)
    }
}

/// What a provider knows about the field it is answering for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionContext {
    pub property_name: String,
    pub input_value: FieldValue,
    pub cursor_position: Option<usize>,
}

/// Identifies the field an orchestrator is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    pub property_name: String,
    /// JSON-Schema fragment of the field. Only inspected, never validated.
    pub schema: Option<Value>,
}

impl FieldBinding {
    pub fn new(property_name: impl Into<String>, schema: Option<Value>) -> Self {
        Self {
            property_name: property_name.into(),
            schema,
        }
    }
}

/// Returns the schema unless it is missing or a falsy scalar (`null`,
/// `false`, `0`, `""`), all of which mean "no schema".
pub fn present_schema(schema: Option<&Value>) -> Option<&Value> {
    schema.filter(|schema| match schema {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// The `type` keyword of a schema fragment, when it is a single string.
pub fn schema_type(schema: &Value) -> Option<&str> {
    schema.get("type").and_then(Value::as_str)
}

/// Suggestions partitioned into the `root` bucket and named groups.
///
/// `root` always exists and always comes first; named groups keep the order
/// in which their first member was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedSuggestions {
    root: Vec<Suggestion>,
    groups: Vec<(String, Vec<Suggestion>)>,
}

impl GroupedSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, suggestion: Suggestion) {
        if suggestion.group_name() == ROOT_GROUP {
            self.root.push(suggestion);
            return;
        }

        let name = suggestion.group_name().to_string();
        match self.groups.iter_mut().find(|(group, _)| *group == name) {
            Some((_, members)) => members.push(suggestion),
            None => self.groups.push((name, vec![suggestion])),
        }
    }

    pub fn root(&self) -> &[Suggestion] {
        &self.root
    }

    /// Named groups in first-seen order (never includes `root`).
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[Suggestion])> {
        self.groups
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    pub fn get(&self, group: &str) -> Option<&[Suggestion]> {
        if group == ROOT_GROUP {
            return Some(&self.root);
        }
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, members)| members.as_slice())
    }

    /// Group names including `root`, in display order.
    pub fn group_names(&self) -> Vec<&str> {
        std::iter::once(ROOT_GROUP)
            .chain(self.groups.iter().map(|(name, _)| name.as_str()))
            .collect()
    }

    /// Total number of suggestions across every bucket.
    pub fn len(&self) -> usize {
        self.root.len() + self.groups.iter().map(|(_, members)| members.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Suggestion> for GroupedSuggestions {
    fn from_iter<I: IntoIterator<Item = Suggestion>>(iter: I) -> Self {
        let mut grouped = GroupedSuggestions::new();
        for suggestion in iter {
            grouped.push(suggestion);
        }
        grouped
    }
}

impl Serialize for GroupedSuggestions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len() + 1))?;
        map.serialize_entry(ROOT_GROUP, &self.root)?;
        for (name, members) in &self.groups {
            map.serialize_entry(name, members)?;
        }
        map.end()
    }
}

/// Keeps suggestions whose value contains `filter`, ignoring case.
pub fn filter_suggestions<'a, I>(suggestions: I, filter: &str) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a Suggestion>,
{
    let needle = filter.to_lowercase();
    suggestions
        .into_iter()
        .filter(|suggestion| needle.is_empty() || suggestion.value.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let grouped: GroupedSuggestions = vec![
            Suggestion::new("a").with_group("B"),
            Suggestion::new("b"),
            Suggestion::new("c").with_group("A"),
            Suggestion::new("d").with_group("B"),
        ]
        .into_iter()
        .collect();

        assert_eq!(grouped.group_names(), vec!["root", "B", "A"]);
        assert_eq!(grouped.root(), &[Suggestion::new("b")]);
        assert_eq!(grouped.get("B").map(|s| s.len()), Some(2));
        assert_eq!(grouped.len(), 4);
    }

    #[test]
    fn test_explicit_root_group_lands_in_root() {
        let grouped: GroupedSuggestions =
            vec![Suggestion::new("x").with_group(ROOT_GROUP)].into_iter().collect();

        assert_eq!(grouped.root().len(), 1);
        assert_eq!(grouped.groups().count(), 0);
    }

    #[test]
    fn test_empty_grouping_still_has_root() {
        let grouped = GroupedSuggestions::new();
        assert_eq!(grouped.get(ROOT_GROUP), Some(&[][..]));
        assert!(grouped.is_empty());
        assert_eq!(serde_json::to_value(&grouped).unwrap(), json!({ "root": [] }));
    }

    #[test]
    fn test_serializes_root_first() {
        let grouped: GroupedSuggestions = vec![
            Suggestion::new("s2").with_group("G"),
            Suggestion::new("s1").with_description("first"),
        ]
        .into_iter()
        .collect();

        let text = serde_json::to_string(&grouped).unwrap();
        assert_eq!(
            text,
            r#"{"root":[{"value":"s1","description":"first"}],"G":[{"value":"s2","group":"G"}]}"#
        );
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let suggestions = vec![
            Suggestion::new("${body}"),
            Suggestion::new("{{Header}}"),
            Suggestion::new("RAW(foo)"),
        ];

        let filtered = filter_suggestions(&suggestions, "HEAD");
        assert_eq!(filtered, vec![Suggestion::new("{{Header}}")]);

        assert_eq!(filter_suggestions(&suggestions, "").len(), 3);
    }

    #[test]
    fn test_number_field_value_text() {
        assert_eq!(FieldValue::from(45i64).as_text(), "45");
        let number = serde_json::Number::from_f64(4.5).unwrap();
        assert_eq!(FieldValue::from(number).as_text(), "4.5");
    }

    #[test]
    fn test_present_schema_treats_falsy_values_as_absent() {
        let null = Value::Null;
        let schema = json!({ "type": "string" });
        assert!(present_schema(Some(&null)).is_none());
        assert!(present_schema(None).is_none());
        assert_eq!(present_schema(Some(&schema)).and_then(schema_type), Some("string"));

        for falsy in [json!(false), json!(0), json!(0.0), json!("")] {
            assert!(present_schema(Some(&falsy)).is_none(), "{} should count as absent", falsy);
        }
        for truthy in [json!(true), json!(1), json!("x"), json!([]), json!({})] {
            assert!(present_schema(Some(&truthy)).is_some(), "{} should count as present", truthy);
        }
    }
}
