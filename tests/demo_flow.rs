use std::sync::Arc;

use form_suggestions::config::SuggestionConfig;
use form_suggestions::suggestions::{
    FetchOutcome, FieldBinding, InputHandle, Key, KeyChord, KeyEvent, KeyOutcome, MemoryInput, MenuEntry,
    SuggestionOrchestrator, SuggestionRegistry, register_demo_providers,
};
use serde_json::json;

fn demo_field(value: &str, schema: serde_json::Value) -> (SuggestionOrchestrator, Arc<MemoryInput>) {
    let registry = Arc::new(SuggestionRegistry::new());
    register_demo_providers(&registry);

    let input = Arc::new(MemoryInput::new(value));
    let orchestrator = SuggestionOrchestrator::new(
        FieldBinding::new("name", Some(schema)),
        input.clone(),
        registry,
        SuggestionConfig::default(),
    );
    (orchestrator, input)
}

async fn activate(orchestrator: &SuggestionOrchestrator, chord: KeyChord) -> FetchOutcome {
    match orchestrator.handle_input_key(&chord.into()) {
        KeyOutcome::Opened(ticket) => ticket.wait().await,
        other => panic!("expected the panel to open, got {:?}", other),
    }
}

#[tokio::test]
async fn test_demo_panel_layout() {
    let (orchestrator, _input) = demo_field("timerName", json!({ "type": "string" }));
    assert_eq!(
        activate(&orchestrator, KeyChord::ctrl_space()).await,
        FetchOutcome::Completed { suggestions: 13 }
    );

    let labels: Vec<String> = orchestrator
        .entries()
        .iter()
        .map(|entry| entry.label().to_string())
        .collect();
    assert_eq!(
        labels,
        vec![
            "RAW(timerName)",
            "{{timerName}}",
            "{{timerName:default}}",
            "Property references",
            "Simple Language",
            "SQL Syntax",
        ]
    );
}

#[tokio::test]
async fn test_demo_providers_skip_non_string_fields() {
    let (orchestrator, _input) = demo_field("12", json!({ "type": "integer" }));
    activate(&orchestrator, KeyChord::alt_escape()).await;

    assert!(matches!(
        orchestrator.entries().as_slice(),
        [MenuEntry::Placeholder { .. }]
    ));
}

#[tokio::test]
async fn test_keyboard_selection_from_group() {
    let (orchestrator, input) = demo_field("timerName", json!({ "type": "string" }));
    activate(&orchestrator, KeyChord::ctrl_space()).await;

    for _ in 0..4 {
        orchestrator.handle_panel_key(&KeyEvent::plain(Key::Down));
    }
    orchestrator.handle_panel_key(&KeyEvent::plain(Key::Right));

    match orchestrator.handle_panel_key(&KeyEvent::plain(Key::Enter)) {
        KeyOutcome::Committed(applied) => assert_eq!(applied.new_value, "{{?timerName}}"),
        other => panic!("expected a commit, got {:?}", other),
    }
    assert_eq!(input.text(), "{{?timerName}}");
    assert_eq!(input.caret(), Some(14));
}

#[tokio::test]
async fn test_filter_typed_into_search_box() {
    let (orchestrator, _input) = demo_field("", json!({ "type": "string" }));
    activate(&orchestrator, KeyChord::ctrl_space()).await;

    for c in "#$".chars() {
        orchestrator.handle_panel_key(&KeyEvent::plain(Key::Char(c)));
    }

    let grouped = orchestrator.grouped_suggestions();
    assert!(grouped.root().is_empty());
    assert_eq!(grouped.group_names(), vec!["root", "SQL Syntax"]);
    assert_eq!(grouped.get("SQL Syntax").map(<[_]>::len), Some(3));
}

#[tokio::test]
async fn test_schema_absent_queries_every_provider() {
    let registry = Arc::new(SuggestionRegistry::new());
    register_demo_providers(&registry);

    let input = Arc::new(MemoryInput::new(""));
    let orchestrator = SuggestionOrchestrator::new(
        FieldBinding::new("name", None),
        input,
        registry,
        SuggestionConfig::default(),
    );

    assert_eq!(orchestrator.open().wait().await, FetchOutcome::Completed { suggestions: 13 });
}
