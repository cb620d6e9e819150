use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Value, json};
use tracing::{debug, info};

use form_suggestions::config::SuggestionConfig;
use form_suggestions::logging::init_logger;
use form_suggestions::suggestions::{
    FieldBinding, FetchOutcome, InputHandle, Key, KeyEvent, KeyOutcome, MemoryInput, MenuEntry,
    PanelFocus, PanelSnapshot, SuggestionOrchestrator, SuggestionRegistry, caret_from_signed,
    parse_chord_list, register_demo_providers,
};

#[derive(Parser, Debug)]
#[command(
    name = "form-suggest",
    version,
    about = "Drive the suggestion panel of a form text field from a scripted key sequence"
)]
struct Cli {
    /// Initial field value
    #[arg(long, default_value = "")]
    value: String,

    /// Caret offset in chars (defaults to the end of the value)
    #[arg(long, allow_negative_numbers = true)]
    caret: Option<i64>,

    /// Property name of the field
    #[arg(long, default_value = "name")]
    property: String,

    /// JSON-Schema fragment describing the field
    #[arg(long, default_value = r#"{"type":"string"}"#)]
    schema: String,

    /// Comma-separated keys, e.g. "ctrl+space,down,enter". Plain characters
    /// type into whichever element has focus.
    #[arg(long, default_value = "ctrl+space")]
    keys: String,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (otherwise RUST_LOG or "info")
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long)]
    no_color: bool,

    /// Also write a DEBUG-level session log to the user cache directory
    #[arg(long)]
    log_file: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<SuggestionConfig> {
    let base = match path {
        Some(path) => SuggestionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SuggestionConfig::default(),
    };
    Ok(base.with_overrides(|name| std::env::var(name).ok())?)
}

async fn settle(outcome: KeyOutcome) -> Option<FetchOutcome> {
    match outcome {
        KeyOutcome::Opened(ticket) => Some(ticket.wait().await),
        _ => None,
    }
}

/// Routes one scripted key the way a host would: to the panel while it is
/// open, otherwise to the input.
async fn press(orchestrator: &SuggestionOrchestrator, input: &MemoryInput, event: KeyEvent) {
    if orchestrator.is_open() {
        let outcome = orchestrator.handle_panel_key(&event);
        debug!("Panel key {:?}: {:?}", event.key, outcome);
        return;
    }

    let outcome = orchestrator.handle_input_key(&event);
    if !matches!(outcome, KeyOutcome::Ignored) {
        if let Some(fetch) = settle(outcome).await {
            debug!("Fetch finished: {:?}", fetch);
        }
        return;
    }

    match event.key {
        Key::Char(c) if !event.modifiers.is_command() => input.type_text(&c.to_string()),
        Key::Backspace => input.backspace(),
        Key::Left => input.set_caret(input.caret().unwrap_or(0).saturating_sub(1)),
        Key::Right => input.set_caret(input.caret().unwrap_or(0) + 1),
        _ => return,
    }

    if let Some(ticket) = orchestrator.on_input_changed() {
        ticket.wait().await;
    }
}

fn print_panel(snapshot: &PanelSnapshot) {
    let marker = |focused: bool| if focused { ">" } else { " " };

    println!("{} [{}]", marker(snapshot.focus == PanelFocus::Search), snapshot.search_filter);

    for (row, entry) in snapshot.entries.iter().enumerate() {
        let focused = snapshot.focus == PanelFocus::Row { index: row };
        match entry {
            MenuEntry::Suggestion { suggestion } => {
                let description = suggestion.description.as_deref().unwrap_or_default();
                println!("{} {:<28} {}", marker(focused), suggestion.value, description);
            }
            MenuEntry::Group { label, suggestions } => {
                println!("{} {} ({})", marker(focused), label, suggestions.len());
                for (index, suggestion) in suggestions.iter().enumerate() {
                    let focused = snapshot.focus == PanelFocus::Child { row, index };
                    let description = suggestion.description.as_deref().unwrap_or_default();
                    println!("    {} {:<24} {}", marker(focused), suggestion.value, description);
                }
            }
            MenuEntry::Placeholder { label } => println!("  ({})", label),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), cli.log_file)
        .context("Failed to initialize logging")?;

    let config = load_config(cli.config.as_ref())?;
    let schema: Value = serde_json::from_str(&cli.schema).context("Invalid --schema JSON")?;
    let script = parse_chord_list(&cli.keys).context("Invalid --keys sequence")?;

    let registry = Arc::new(SuggestionRegistry::new());
    register_demo_providers(&registry);

    let mut input = MemoryInput::new(cli.value.as_str());
    if let Some(caret) = cli.caret {
        input = input.with_caret(caret_from_signed(caret));
    }
    let input = Arc::new(input);

    let orchestrator = SuggestionOrchestrator::new(
        FieldBinding::new(cli.property.as_str(), Some(schema)),
        input.clone(),
        registry,
        config,
    );

    info!("Running {} scripted keys against '{}'", script.len(), cli.property);
    for chord in script {
        press(&orchestrator, &input, chord.into()).await;
    }

    let snapshot = orchestrator.snapshot();
    let caret = input.caret().unwrap_or(0);

    if cli.json {
        let output = json!({
            "value": input.text(),
            "caret": caret,
            "panel": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if orchestrator.is_open() {
            print_panel(&snapshot);
            println!();
        }
        println!("value: {}", input.text());
        println!("caret: {}", caret);
    }

    Ok(())
}
