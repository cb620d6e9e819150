//! Per-input suggestion state machine
//!
//! A [`SuggestionOrchestrator`] is bound to one text control and moves
//! between two states:
//!
//! ```text
//!            activation chord / open()
//!   Closed ───────────────────────────▶ Open ──┐ value change / re-trigger
//!     ▲                                  │  ▲  │ (new fetch, older one
//!     └──── Escape / close() / commit ───┘  └──┘  is superseded)
//! ```
//!
//! Every fetch queries all applicable providers concurrently. Each provider
//! call is isolated: an error, a panic or a timeout only empties that
//! provider's contribution. Results are merged in provider order and
//! published as providers settle, so a provider that never answers does not
//! hide the others.
//!
//! # Cancellation
//!
//! Each fetch takes a generation number under the session lock. Starting a
//! newer fetch or closing the panel bumps the generation and aborts the
//! previous task; a publish carrying a stale generation is dropped, so an
//! older fetch can never overwrite a newer one regardless of resolution
//! order.
//!
//! Fetches are spawned on the ambient Tokio runtime.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, trace, warn};

use super::apply::{Applied, apply_to_value};
use super::cursor::locate_value;
use super::input::InputHandle;
use super::keys::{Key, KeyEvent};
use super::menu::{self, FocusTarget, MenuEntry, Move, PanelFocus};
use super::model::{FieldBinding, GroupedSuggestions, Suggestion, SuggestionContext, filter_suggestions};
use super::provider::SuggestionProvider;
use super::registry::SuggestionRegistry;
use crate::config::SuggestionConfig;
use crate::error::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelStatus {
    Closed,
    Open,
}

/// How a fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Every provider settled and the result is what the panel shows.
    Completed { suggestions: usize },
    /// A newer fetch started, the panel closed or the orchestrator was
    /// dropped first; nothing was kept.
    Superseded,
    /// The fetch task itself panicked; the panel keeps its previous rows.
    Failed,
}

/// Handle to a spawned fetch.
///
/// Dropping the ticket does not cancel the fetch.
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
    handle: JoinHandle<FetchOutcome>,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the fetch to finish.
    pub async fn wait(self) -> FetchOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => FetchOutcome::Superseded,
            Err(e) => {
                error!("Suggestion fetch {} failed: {}", self.generation, e);
                FetchOutcome::Failed
            }
        }
    }
}

/// Effect of a key event handed to the orchestrator.
#[derive(Debug)]
pub enum KeyOutcome {
    /// Not meant for the suggestion panel; the host should handle it.
    Ignored,
    /// Consumed (navigation, filter editing).
    Handled,
    /// The panel opened and a fetch started.
    Opened(FetchTicket),
    /// The panel closed without a selection.
    Closed,
    /// A suggestion was applied to the input.
    Committed(Applied),
}

/// Serializable view of the panel, for hosts and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub status: PanelStatus,
    pub search_filter: String,
    pub fetching: bool,
    pub grouped: GroupedSuggestions,
    pub entries: Vec<MenuEntry>,
    pub focus: PanelFocus,
}

struct Session {
    status: PanelStatus,
    search_filter: String,
    /// Unfiltered, flattened results of the current fetch.
    results: Vec<Suggestion>,
    grouped: GroupedSuggestions,
    entries: Vec<MenuEntry>,
    focus: PanelFocus,
    fetching: bool,
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl Session {
    fn new(config: &SuggestionConfig) -> Self {
        let mut session = Self {
            status: PanelStatus::Closed,
            search_filter: String::new(),
            results: Vec::new(),
            grouped: GroupedSuggestions::new(),
            entries: Vec::new(),
            focus: menu::initial_focus(config.search_box),
            fetching: false,
            generation: 0,
            in_flight: None,
        };
        session.refresh(config);
        session
    }

    /// Invalidates any running fetch.
    fn cancel_in_flight(&mut self) {
        self.generation += 1;
        self.fetching = false;
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    fn reset(&mut self, config: &SuggestionConfig) {
        self.search_filter.clear();
        self.results.clear();
        self.focus = menu::initial_focus(config.search_box);
        self.refresh(config);
    }

    /// Re-derives groups, rows and focus from `results` and the filter.
    fn refresh(&mut self, config: &SuggestionConfig) {
        self.grouped = filter_suggestions(&self.results, &self.search_filter)
            .into_iter()
            .collect();
        self.entries = menu::build_entries(&self.grouped, &config.placeholder);
        self.focus = menu::clamp_focus(self.focus, &self.entries, config.search_box);
    }
}

struct Inner {
    binding: FieldBinding,
    input: Arc<dyn InputHandle>,
    registry: Arc<SuggestionRegistry>,
    config: SuggestionConfig,
    session: Mutex<Session>,
}

impl Inner {
    /// Stores merged results unless `generation` is stale. Returns the
    /// number of suggestions now visible.
    fn publish(&self, generation: u64, slots: &[Option<Vec<Suggestion>>], done: bool) -> Option<usize> {
        let mut session = self.session.lock();

        if session.generation != generation || session.status == PanelStatus::Closed {
            trace!(
                "Discarding stale suggestions for '{}' (fetch {}, current {})",
                self.binding.property_name, generation, session.generation
            );
            return None;
        }

        session.results = slots.iter().flatten().flatten().cloned().collect();
        session.refresh(&self.config);
        if done {
            session.fetching = false;
            session.in_flight = None;
        }

        Some(session.grouped.len())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.session.get_mut().in_flight.take() {
            trace!("Aborting fetch for dropped '{}' suggestions", self.binding.property_name);
            handle.abort();
        }
    }
}

/// Publishes through a weak handle; a dropped orchestrator rejects everything.
fn publish(inner: &Weak<Inner>, generation: u64, slots: &[Option<Vec<Suggestion>>], done: bool) -> Option<usize> {
    inner.upgrade()?.publish(generation, slots, done)
}

/// Suggestion controller bound to one input.
///
/// Cloning yields another handle to the same session.
///
/// # Example
///
/// ```rust,ignore
/// let input = Arc::new(MemoryInput::new("timerName"));
/// let orchestrator = SuggestionOrchestrator::new(
///     FieldBinding::new("name", Some(json!({ "type": "string" }))),
///     input.clone(),
///     registry.clone(),
///     SuggestionConfig::default(),
/// );
///
/// if let KeyOutcome::Opened(ticket) = orchestrator.handle_input_key(&ctrl_space) {
///     ticket.wait().await;
/// }
/// let rows = orchestrator.entries();
/// ```
#[derive(Clone)]
pub struct SuggestionOrchestrator {
    inner: Arc<Inner>,
}

impl SuggestionOrchestrator {
    pub fn new(
        binding: FieldBinding,
        input: Arc<dyn InputHandle>,
        registry: Arc<SuggestionRegistry>,
        config: SuggestionConfig,
    ) -> Self {
        let session = Mutex::new(Session::new(&config));
        Self {
            inner: Arc::new(Inner {
                binding,
                input,
                registry,
                config,
                session,
            }),
        }
    }

    pub fn binding(&self) -> &FieldBinding {
        &self.inner.binding
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.inner.config
    }

    pub fn status(&self) -> PanelStatus {
        self.inner.session.lock().status
    }

    pub fn is_open(&self) -> bool {
        self.status() == PanelStatus::Open
    }

    /// True while the latest fetch still has providers outstanding.
    pub fn is_fetching(&self) -> bool {
        self.inner.session.lock().fetching
    }

    pub fn search_filter(&self) -> String {
        self.inner.session.lock().search_filter.clone()
    }

    /// Grouped result of the latest fetch, after filtering.
    pub fn grouped_suggestions(&self) -> GroupedSuggestions {
        self.inner.session.lock().grouped.clone()
    }

    /// Panel rows; empty while closed.
    pub fn entries(&self) -> Vec<MenuEntry> {
        let session = self.inner.session.lock();
        match session.status {
            PanelStatus::Open => session.entries.clone(),
            PanelStatus::Closed => Vec::new(),
        }
    }

    pub fn focus(&self) -> PanelFocus {
        self.inner.session.lock().focus
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        let session = self.inner.session.lock();
        let open = session.status == PanelStatus::Open;
        PanelSnapshot {
            status: session.status,
            search_filter: session.search_filter.clone(),
            fetching: session.fetching,
            grouped: session.grouped.clone(),
            entries: if open { session.entries.clone() } else { Vec::new() },
            focus: session.focus,
        }
    }

    /// Key pressed in the bound input.
    ///
    /// Activation chords open (or re-open) the panel while the input has
    /// focus; Escape closes an open panel.
    pub fn handle_input_key(&self, event: &KeyEvent) -> KeyOutcome {
        if !self.inner.input.has_focus() {
            return KeyOutcome::Ignored;
        }

        if self.inner.config.activation.iter().any(|chord| chord.matches(event)) {
            return KeyOutcome::Opened(self.open());
        }

        if event.key == Key::Escape && self.is_open() {
            self.close();
            return KeyOutcome::Closed;
        }

        KeyOutcome::Ignored
    }

    /// Key pressed while focus is inside the open panel.
    pub fn handle_panel_key(&self, event: &KeyEvent) -> KeyOutcome {
        let search_box = self.inner.config.search_box;
        let mut session = self.inner.session.lock();

        if session.status != PanelStatus::Open {
            return KeyOutcome::Ignored;
        }

        let in_search = session.focus == PanelFocus::Search;
        let step = match event.key {
            Key::Escape => {
                drop(session);
                self.close();
                return KeyOutcome::Closed;
            }
            Key::Enter => {
                let target = match menu::focus_target(session.focus, &session.entries) {
                    FocusTarget::Suggestion(suggestion) => Some(suggestion.clone()),
                    FocusTarget::Group(_) => None,
                    FocusTarget::Search | FocusTarget::Nothing => return KeyOutcome::Ignored,
                };
                match target {
                    Some(suggestion) => {
                        drop(session);
                        return KeyOutcome::Committed(self.commit(&suggestion));
                    }
                    None => Move::Into,
                }
            }
            Key::Down => Move::Down,
            Key::Up => Move::Up,
            Key::Right if !in_search => Move::Into,
            Key::Left if !in_search => Move::Out,
            Key::Char(c) if in_search && !event.modifiers.is_command() => {
                session.search_filter.push(c);
                session.refresh(&self.inner.config);
                return KeyOutcome::Handled;
            }
            Key::Backspace if in_search => {
                session.search_filter.pop();
                session.refresh(&self.inner.config);
                return KeyOutcome::Handled;
            }
            _ => return KeyOutcome::Ignored,
        };

        session.focus = menu::navigate(session.focus, &session.entries, step, search_box);
        KeyOutcome::Handled
    }

    /// Opens the panel with a fresh session and starts a fetch.
    pub fn open(&self) -> FetchTicket {
        debug!("Opening suggestions for '{}'", self.inner.binding.property_name);
        self.start_fetch(true)
    }

    /// Closes the panel, drops its results and refocuses the input.
    ///
    /// Any fetch still running becomes irrelevant.
    pub fn close(&self) {
        self.close_session();
        self.inner.input.focus();
    }

    fn close_session(&self) {
        let mut session = self.inner.session.lock();
        if session.status == PanelStatus::Closed {
            return;
        }
        session.status = PanelStatus::Closed;
        session.cancel_in_flight();
        session.reset(&self.inner.config);
        debug!("Closed suggestions for '{}'", self.inner.binding.property_name);
    }

    /// Replaces the filter and re-filters the last results without
    /// querying providers again. No-op while closed.
    pub fn set_search_filter(&self, filter: impl Into<String>) {
        let mut session = self.inner.session.lock();
        if session.status != PanelStatus::Open {
            return;
        }
        session.search_filter = filter.into();
        session.refresh(&self.inner.config);
    }

    /// The bound input's value or caret changed. While open this starts a
    /// new fetch that supersedes the running one.
    pub fn on_input_changed(&self) -> Option<FetchTicket> {
        if !self.is_open() {
            return None;
        }
        Some(self.start_fetch(false))
    }

    /// Applies `suggestion` at the input's live caret, writes the new value,
    /// closes the panel and puts the caret after the inserted text.
    pub fn commit(&self, suggestion: &Suggestion) -> Applied {
        let input = &self.inner.input;
        let applied = apply_to_value(suggestion, &input.value(), input.caret());

        debug!(
            "Committing suggestion '{}' for '{}'",
            suggestion.value, self.inner.binding.property_name
        );

        input.set_value(&applied.new_value);
        self.close_session();
        input.focus();
        input.set_caret(applied.new_caret);

        applied
    }

    /// Commits the suggestion under panel focus, if any.
    pub fn commit_focused(&self) -> Option<Applied> {
        let suggestion = {
            let session = self.inner.session.lock();
            match menu::focus_target(session.focus, &session.entries) {
                FocusTarget::Suggestion(suggestion) => suggestion.clone(),
                _ => return None,
            }
        };
        Some(self.commit(&suggestion))
    }

    /// Starts a fetch superseding any running one. With `reopen`, the panel
    /// is opened and reset under the same lock that takes the generation.
    fn start_fetch(&self, reopen: bool) -> FetchTicket {
        let inner = &self.inner;
        let value = inner.input.value();
        let caret = inner.input.caret();
        let word = locate_value(&value, caret).word;

        let providers = inner
            .registry
            .query(&inner.binding.property_name, inner.binding.schema.as_ref());

        let context = SuggestionContext {
            property_name: inner.binding.property_name.clone(),
            input_value: value,
            cursor_position: caret,
        };

        let generation = {
            let mut session = inner.session.lock();
            session.cancel_in_flight();
            if reopen {
                session.status = PanelStatus::Open;
                session.reset(&inner.config);
            }
            session.fetching = true;
            session.generation
        };

        debug!(
            "Fetching suggestions for '{}' (fetch {}, word '{}', {} providers)",
            inner.binding.property_name,
            generation,
            word,
            providers.len()
        );

        let handle = tokio::spawn(run_fetch(
            Arc::downgrade(inner),
            generation,
            inner.config.provider_timeout(),
            word,
            context,
            providers,
        ));

        let mut session = inner.session.lock();
        if session.generation == generation {
            session.in_flight = Some(handle.abort_handle());
        }

        FetchTicket { generation, handle }
    }
}

async fn run_fetch(
    inner: Weak<Inner>,
    generation: u64,
    timeout: Option<Duration>,
    word: String,
    context: SuggestionContext,
    providers: Vec<Arc<dyn SuggestionProvider>>,
) -> FetchOutcome {
    let mut slots: Vec<Option<Vec<Suggestion>>> = vec![None; providers.len()];

    if providers.is_empty() {
        return match publish(&inner, generation, &slots, true) {
            Some(suggestions) => FetchOutcome::Completed { suggestions },
            None => FetchOutcome::Superseded,
        };
    }

    let word: Arc<str> = word.into();
    let context = Arc::new(context);

    let mut pending: FuturesUnordered<_> = providers
        .into_iter()
        .enumerate()
        .map(|(index, provider)| {
            let word = word.clone();
            let context = context.clone();
            async move {
                let suggestions = settle(provider.as_ref(), &word, &context, timeout).await;
                (index, suggestions)
            }
        })
        .collect();

    let mut remaining = slots.len();
    let mut visible = 0;

    while let Some((index, suggestions)) = pending.next().await {
        slots[index] = Some(suggestions);
        remaining -= 1;

        match publish(&inner, generation, &slots, remaining == 0) {
            Some(count) => visible = count,
            None => return FetchOutcome::Superseded,
        }
    }

    trace!("Fetch {} completed with {} suggestions", generation, visible);
    FetchOutcome::Completed { suggestions: visible }
}

/// Runs one provider call, turning errors, panics and timeouts into an
/// empty contribution.
async fn settle(
    provider: &dyn SuggestionProvider,
    word: &str,
    context: &SuggestionContext,
    timeout: Option<Duration>,
) -> Vec<Suggestion> {
    let call = AssertUnwindSafe(provider.suggestions(word, context)).catch_unwind();

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Ok(Err(ProviderError::Timeout {
                id: provider.id().to_string(),
                after_ms: limit.as_millis() as u64,
            })),
        },
        None => call.await,
    };

    match result {
        Ok(Ok(suggestions)) => {
            trace!("Provider '{}' returned {} suggestions", provider.id(), suggestions.len());
            suggestions
        }
        Ok(Err(e)) => {
            warn!("Suggestion provider '{}' failed: {}", provider.id(), e);
            Vec::new()
        }
        Err(_) => {
            error!("Suggestion provider '{}' panicked", provider.id());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestions::input::MemoryInput;
    use crate::suggestions::keys::{KeyChord, Modifiers};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider returning a fixed list and counting its calls
    struct FixedProvider {
        id: &'static str,
        suggestions: Vec<Suggestion>,
        calls: AtomicUsize,
        words: Mutex<Vec<String>>,
    }

    impl FixedProvider {
        fn new(id: &'static str, suggestions: Vec<Suggestion>) -> Arc<Self> {
            Arc::new(Self {
                id,
                suggestions,
                calls: AtomicUsize::new(0),
                words: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl SuggestionProvider for FixedProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn applies_to(&self, _property_name: &str, _schema: &Value) -> bool {
            true
        }

        async fn suggestions(
            &self,
            word: &str,
            _context: &SuggestionContext,
        ) -> Result<Vec<Suggestion>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.words.lock().push(word.to_string());
            Ok(self.suggestions.clone())
        }
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl SuggestionProvider for FailingProvider {
        fn id(&self) -> &str {
            "failing"
        }

        fn applies_to(&self, _property_name: &str, _schema: &Value) -> bool {
            true
        }

        async fn suggestions(
            &self,
            _word: &str,
            _context: &SuggestionContext,
        ) -> Result<Vec<Suggestion>, ProviderError> {
            Err(ProviderError::Failed("boom".to_string()))
        }
    }

    fn setup(
        value: &str,
        providers: Vec<Arc<dyn SuggestionProvider>>,
    ) -> (SuggestionOrchestrator, Arc<MemoryInput>) {
        let registry = Arc::new(SuggestionRegistry::new());
        for provider in providers {
            registry.register(provider);
        }
        let input = Arc::new(MemoryInput::new(value));
        let orchestrator = SuggestionOrchestrator::new(
            FieldBinding::new("testProp", Some(json!({ "type": "string" }))),
            input.clone(),
            registry,
            SuggestionConfig::default(),
        );
        (orchestrator, input)
    }

    fn ctrl_space() -> KeyEvent {
        KeyChord::ctrl_space().into()
    }

    async fn open(orchestrator: &SuggestionOrchestrator) -> FetchOutcome {
        match orchestrator.handle_input_key(&ctrl_space()) {
            KeyOutcome::Opened(ticket) => ticket.wait().await,
            other => panic!("expected the panel to open, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_until_activation() {
        let provider = FixedProvider::new("p", vec![Suggestion::new("s")]);
        let (orchestrator, _input) = setup("", vec![provider.clone()]);

        assert_eq!(orchestrator.status(), PanelStatus::Closed);
        assert!(orchestrator.entries().is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let outcome = orchestrator.handle_input_key(&KeyEvent::plain(Key::Char('a')));
        assert!(matches!(outcome, KeyOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_activation_requires_input_focus() {
        let provider = FixedProvider::new("p", vec![Suggestion::new("s")]);
        let (orchestrator, input) = setup("", vec![provider]);

        input.blur();
        assert!(matches!(orchestrator.handle_input_key(&ctrl_space()), KeyOutcome::Ignored));
        assert!(!orchestrator.is_open());
    }

    #[tokio::test]
    async fn test_alt_escape_also_opens() {
        let (orchestrator, _input) = setup("", vec![]);
        let outcome = orchestrator.handle_input_key(&KeyChord::alt_escape().into());
        assert!(matches!(outcome, KeyOutcome::Opened(_)));
        assert!(orchestrator.is_open());
    }

    #[tokio::test]
    async fn test_fetch_passes_word_under_caret() {
        let provider = FixedProvider::new("p", vec![]);
        let (orchestrator, input) = setup("alpha beta", vec![provider.clone()]);
        input.set_caret(2);

        open(&orchestrator).await;
        assert_eq!(provider.words.lock().clone(), vec!["alpha".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_provider_does_not_hide_others() {
        let provider = FixedProvider::new("ok", vec![Suggestion::new("kept")]);
        let (orchestrator, _input) = setup("", vec![Arc::new(FailingProvider), provider]);

        let outcome = open(&orchestrator).await;
        assert_eq!(outcome, FetchOutcome::Completed { suggestions: 1 });
        assert_eq!(orchestrator.grouped_suggestions().root(), &[Suggestion::new("kept")]);
    }

    #[tokio::test]
    async fn test_escape_closes_and_refocuses() {
        let (orchestrator, input) = setup("", vec![]);
        open(&orchestrator).await;
        input.blur();

        let outcome = orchestrator.handle_panel_key(&KeyEvent::plain(Key::Escape));
        assert!(matches!(outcome, KeyOutcome::Closed));
        assert!(!orchestrator.is_open());
        assert!(input.has_focus());
    }

    #[tokio::test]
    async fn test_escape_in_input_closes_open_panel() {
        let (orchestrator, _input) = setup("", vec![]);
        open(&orchestrator).await;

        let outcome = orchestrator.handle_input_key(&KeyEvent::plain(Key::Escape));
        assert!(matches!(outcome, KeyOutcome::Closed));
        assert!(!orchestrator.is_open());
    }

    #[tokio::test]
    async fn test_filter_does_not_requery() {
        let provider = FixedProvider::new(
            "p",
            vec![Suggestion::new("suggestion1"), Suggestion::new("other").with_group("group1")],
        );
        let (orchestrator, _input) = setup("", vec![provider.clone()]);
        open(&orchestrator).await;

        orchestrator.set_search_filter("OTH");
        let grouped = orchestrator.grouped_suggestions();
        assert!(grouped.root().is_empty());
        assert_eq!(grouped.get("group1").map(|s| s.len()), Some(1));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_typing_in_search_box_filters() {
        let provider = FixedProvider::new("p", vec![Suggestion::new("abc"), Suggestion::new("xyz")]);
        let (orchestrator, _input) = setup("", vec![provider]);
        open(&orchestrator).await;

        orchestrator.handle_panel_key(&KeyEvent::plain(Key::Char('x')));
        assert_eq!(orchestrator.search_filter(), "x");
        assert_eq!(orchestrator.grouped_suggestions().root(), &[Suggestion::new("xyz")]);

        orchestrator.handle_panel_key(&KeyEvent::plain(Key::Backspace));
        assert_eq!(orchestrator.grouped_suggestions().len(), 2);
    }

    #[tokio::test]
    async fn test_reopen_clears_filter() {
        let (orchestrator, _input) = setup("", vec![]);
        open(&orchestrator).await;
        orchestrator.set_search_filter("new search");

        open(&orchestrator).await;
        assert_eq!(orchestrator.search_filter(), "");
    }

    #[tokio::test]
    async fn test_enter_commits_focused_suggestion() {
        let provider = FixedProvider::new("p", vec![Suggestion::new("suggestion1")]);
        let (orchestrator, input) = setup("", vec![provider]);
        open(&orchestrator).await;

        orchestrator.handle_panel_key(&KeyEvent::plain(Key::Down));
        let outcome = orchestrator.handle_panel_key(&KeyEvent::plain(Key::Enter));

        match outcome {
            KeyOutcome::Committed(applied) => assert_eq!(applied.new_value, "suggestion1"),
            other => panic!("expected a commit, got {:?}", other),
        }
        assert_eq!(input.text(), "suggestion1");
        assert_eq!(input.caret(), Some(11));
        assert!(!orchestrator.is_open());
    }

    #[tokio::test]
    async fn test_modified_chars_do_not_edit_filter() {
        let (orchestrator, _input) = setup("", vec![]);
        open(&orchestrator).await;

        let ctrl_a = KeyEvent::new(Key::Char('a'), Modifiers { ctrl: true, ..Modifiers::NONE });
        assert!(matches!(orchestrator.handle_panel_key(&ctrl_a), KeyOutcome::Ignored));
        assert_eq!(orchestrator.search_filter(), "");
    }

    #[tokio::test]
    async fn test_input_change_while_closed_is_ignored() {
        let provider = FixedProvider::new("p", vec![]);
        let (orchestrator, _input) = setup("", vec![provider.clone()]);

        assert!(orchestrator.on_input_changed().is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_close_discards_results() {
        let provider = FixedProvider::new("p", vec![Suggestion::new("s")]);
        let (orchestrator, _input) = setup("", vec![provider]);
        open(&orchestrator).await;
        assert_eq!(orchestrator.grouped_suggestions().len(), 1);

        orchestrator.close();
        assert!(orchestrator.grouped_suggestions().is_empty());
        assert!(orchestrator.entries().is_empty());
    }

    #[tokio::test]
    async fn test_reopen_rejects_previous_generation() {
        let provider = FixedProvider::new("p", vec![Suggestion::new("s")]);
        let (orchestrator, _input) = setup("", vec![provider]);
        let first = orchestrator.open();
        let stale = first.generation();

        let second = orchestrator.open();
        assert_eq!(orchestrator.inner.session.lock().generation, second.generation());

        let late = vec![Some(vec![Suggestion::new("late")])];
        assert_eq!(orchestrator.inner.publish(stale, &late, true), None);

        assert_eq!(second.wait().await, FetchOutcome::Completed { suggestions: 1 });
        assert_eq!(orchestrator.grouped_suggestions().root(), &[Suggestion::new("s")]);
    }

    fn exploding_fetch() -> FetchOutcome {
        panic!("fetch task exploded")
    }

    #[tokio::test]
    async fn test_panicking_fetch_task_reports_failure() {
        let ticket = FetchTicket {
            generation: 7,
            handle: tokio::spawn(async { exploding_fetch() }),
        };
        assert_eq!(ticket.wait().await, FetchOutcome::Failed);
    }

    #[tokio::test]
    async fn test_publish_after_drop_is_rejected() {
        let (orchestrator, _input) = setup("", vec![]);
        let weak = Arc::downgrade(&orchestrator.inner);
        drop(orchestrator);

        assert_eq!(publish(&weak, 1, &[], true), None);
    }
}
