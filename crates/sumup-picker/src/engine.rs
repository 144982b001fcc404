//! Picker state machine
//!
//! The engine is pure: it consumes one [`PickerEvent`] at a time and returns
//! the [`Effect`]s the runtime has to carry out (start a fetch, arm a
//! debounce timer). It never blocks and never touches the terminal.
//!
//! Every fetch carries a [`RequestId`] and the [`LevelId`] it targets. A
//! completion is applied only when it is the latest request of its kind for a
//! level that is still alive, so slow responses can never overwrite newer
//! state.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;
use std::time::Duration;

use crate::input::TextInput;
use crate::navigation::{LevelId, NavigationStack, RequestId};
use crate::record::{FetchError, MembershipRecord, ParentRef};
use crate::search::{DEBOUNCE_DELAY, DebounceTicket, SearchController};

/// Rows of the list shown at once
pub const VISIBLE_ROWS: usize = 10;

#[derive(Debug, Clone)]
pub struct PickerConfig {
    pub debounce: Duration,
    pub visible_rows: usize,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            debounce: DEBOUNCE_DELAY,
            visible_rows: VISIBLE_ROWS,
        }
    }
}

/// What a fetch is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    /// Unfiltered listing of a freshly entered level
    Listing,
    /// Name-filtered search within the current level
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub id: RequestId,
    pub level: LevelId,
    pub kind: FetchKind,
    pub query: Option<String>,
    pub parent: Option<ParentRef>,
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub request: FetchRequest,
    pub result: Result<Vec<MembershipRecord>, FetchError>,
}

#[derive(Debug, Clone)]
pub enum PickerEvent {
    Key(KeyEvent),
    DebounceFired(DebounceTicket),
    FetchCompleted(FetchResponse),
}

/// Work the runtime performs on behalf of the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(FetchRequest),
    ArmDebounce {
        ticket: DebounceTicket,
        delay: Duration,
    },
}

/// How a picker session ended
#[derive(Debug, Clone, PartialEq)]
pub enum PickerOutcome {
    Selected(MembershipRecord),
    Cancelled,
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Navigating the list
    Browsing,
    /// Search input has focus
    Searching,
    /// A fetch failed; only quitting is possible
    Failed(FetchError),
    /// Session is over
    Finished(PickerOutcome),
}

pub struct PickerEngine {
    config: PickerConfig,
    phase: Phase,
    nav: NavigationStack,
    search: SearchController,
    input: TextInput,
    cursor: usize,
    next_request: u64,
}

impl PickerEngine {
    /// Engine positioned at the root level with an already fetched listing
    pub fn new(root_items: Vec<MembershipRecord>) -> Self {
        Self::with_config(root_items, PickerConfig::default())
    }

    pub fn with_config(root_items: Vec<MembershipRecord>, config: PickerConfig) -> Self {
        Self {
            config,
            phase: Phase::Browsing,
            nav: NavigationStack::new(root_items),
            search: SearchController::new(),
            input: TextInput::default(),
            cursor: 0,
            next_request: 0,
        }
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn navigation(&self) -> &NavigationStack {
        &self.nav
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn displayed(&self) -> &[MembershipRecord] {
        self.nav.displayed()
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.phase, Phase::Searching)
    }

    pub fn is_loading(&self) -> bool {
        self.nav.current().is_loading()
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.phase {
            Phase::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    pub fn outcome(&self) -> Option<&PickerOutcome> {
        match &self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn into_outcome(self) -> Option<PickerOutcome> {
        match self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Record under the cursor
    pub fn highlighted(&self) -> Option<&MembershipRecord> {
        self.displayed().get(self.cursor)
    }

    pub fn handle(&mut self, event: PickerEvent) -> Vec<Effect> {
        if self.is_finished() {
            return Vec::new();
        }
        match event {
            PickerEvent::Key(key) => self.on_key(key),
            PickerEvent::DebounceFired(ticket) => self.on_debounce_fired(ticket),
            PickerEvent::FetchCompleted(response) => {
                self.on_fetch_completed(response);
                Vec::new()
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if let Phase::Failed(err) = &self.phase {
            if key.code == KeyCode::Char('q') || (ctrl && key.code == KeyCode::Char('c')) {
                let outcome = PickerOutcome::Failed(err.clone());
                self.finish(outcome);
            }
            return Vec::new();
        }

        if ctrl && key.code == KeyCode::Char('c') {
            self.finish(PickerOutcome::Cancelled);
            return Vec::new();
        }

        if self.is_searching() {
            self.on_search_key(key)
        } else {
            self.on_browse_key(key)
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => {
                self.clear_search();
                Vec::new()
            }
            KeyCode::Enter => {
                // Keep the filtered results, release focus
                self.phase = Phase::Browsing;
                Vec::new()
            }
            _ => {
                let before = self.input.text().to_string();
                if !self.input.handle_key(key.code, key.modifiers) || self.input.text() == before {
                    return Vec::new();
                }
                self.cursor = 0;
                match self.search.on_query_changed(self.input.text()) {
                    Some(ticket) => vec![Effect::ArmDebounce {
                        ticket,
                        delay: self.config.debounce,
                    }],
                    None => Vec::new(),
                }
            }
        }
    }

    fn on_browse_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let page = self.config.visible_rows.max(1);
        match key.code {
            KeyCode::Char('q') => self.finish(PickerOutcome::Cancelled),
            KeyCode::Esc => {
                if self.nav.pop() {
                    self.reset_search();
                    self.cursor = 0;
                }
            }
            KeyCode::Char('/') => self.phase = Phase::Searching,
            KeyCode::Enter => return self.select_highlighted(),
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor_to(self.cursor + 1),
            KeyCode::PageUp => self.cursor = self.cursor.saturating_sub(page),
            KeyCode::PageDown => self.move_cursor_to(self.cursor + page),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.move_cursor_to(usize::MAX),
            _ => {}
        }
        Vec::new()
    }

    fn select_highlighted(&mut self) -> Vec<Effect> {
        let Some(record) = self.highlighted().cloned() else {
            return Vec::new();
        };

        if record.is_organization() {
            return vec![self.drill_down(record.as_parent())];
        }

        self.finish(PickerOutcome::Selected(record));
        Vec::new()
    }

    /// Enter an organization and request its listing
    fn drill_down(&mut self, parent: ParentRef) -> Effect {
        debug!("drilling into {} ({})", parent.name, parent.id);
        self.nav.push(parent);
        self.reset_search();
        self.cursor = 0;
        Effect::Fetch(self.issue(FetchKind::Listing, None))
    }

    fn on_debounce_fired(&mut self, ticket: DebounceTicket) -> Vec<Effect> {
        if !matches!(self.phase, Phase::Browsing | Phase::Searching) {
            return Vec::new();
        }
        match self.search.on_debounce_fired(ticket) {
            Some(query) => {
                let query = (!query.is_empty()).then_some(query);
                vec![Effect::Fetch(self.issue(FetchKind::Search, query))]
            }
            None => Vec::new(),
        }
    }

    /// Allocate a request id for the current level and remember it as the latest of its kind
    fn issue(&mut self, kind: FetchKind, query: Option<String>) -> FetchRequest {
        self.next_request += 1;
        let id = RequestId(self.next_request);

        let level = self.nav.current_mut();
        match kind {
            FetchKind::Listing => level.pending_listing = Some(id),
            FetchKind::Search => level.pending_search = Some(id),
        }

        let request = FetchRequest {
            id,
            level: level.id(),
            kind,
            query,
            parent: level.parent().cloned(),
        };
        debug!("issuing fetch {:?}", request);
        request
    }

    fn on_fetch_completed(&mut self, response: FetchResponse) {
        if !matches!(self.phase, Phase::Browsing | Phase::Searching) {
            return;
        }

        let FetchResponse { request, result } = response;
        let current_level = self.nav.current().id();

        let Some(level) = self.nav.level_mut(request.level) else {
            debug!("discarding response {:?}: level is gone", request.id);
            return;
        };

        let latest = match request.kind {
            FetchKind::Listing => &mut level.pending_listing,
            // Search results only make sense for the level being searched
            FetchKind::Search if request.level == current_level => &mut level.pending_search,
            FetchKind::Search => {
                debug!("discarding search response {:?}: level left", request.id);
                return;
            }
        };
        if *latest != Some(request.id) {
            debug!("discarding stale response {:?}", request.id);
            return;
        }
        *latest = None;

        let items = match result {
            Ok(items) => items,
            Err(err) => {
                debug!("fetch {:?} failed: {}", request.id, err);
                self.phase = Phase::Failed(err);
                return;
            }
        };

        match (request.kind, request.query) {
            (FetchKind::Search, Some(_)) => level.set_filtered(items),
            // An unfiltered search is the level's listing
            (FetchKind::Search, None) => {
                level.clear_filter();
                level.replace_items(items);
            }
            (FetchKind::Listing, _) => level.replace_items(items),
        }

        if request.level == current_level {
            self.clamp_cursor();
        }
    }

    /// Leave search mode and go back to the level's own listing
    fn clear_search(&mut self) {
        self.phase = Phase::Browsing;
        self.reset_search();
        self.cursor = 0;
    }

    fn reset_search(&mut self) {
        self.search.clear();
        self.input.clear();
        self.nav.current_mut().clear_filter();
    }

    fn move_cursor_to(&mut self, index: usize) {
        let last = self.displayed().len().saturating_sub(1);
        self.cursor = index.min(last);
    }

    fn clamp_cursor(&mut self) {
        let len = self.displayed().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    fn finish(&mut self, outcome: PickerOutcome) {
        debug!("picker finished: {:?}", outcome);
        self.phase = Phase::Finished(outcome);
    }
}
