//! Router: URL hash <-> page identifier, history, navigation generations
//!
//! Every navigation gets a ticket from [`Navigator::begin`]. A fetch whose
//! ticket is no longer current when it resolves is discarded, so the last
//! *requested* page wins rather than the last *resolved* one. History is
//! recorded on commit, after the fragment arrived, and only for tickets that
//! asked for it; back/forward replays never push.

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::config::ViewerConfig;
use crate::error::ViewerError;

// =============================================================================
// Hash Mapping
// =============================================================================

/// Page identifier encoded by `hash`, or the default page
pub fn route_from_hash(hash: &str, config: &ViewerConfig) -> String {
    let raw = hash.strip_prefix('#').unwrap_or(hash);
    if !raw.is_empty() && config.route_prefixes.iter().any(|p| raw.starts_with(p.as_str())) {
        raw.to_string()
    } else {
        config.default_page.clone()
    }
}

/// True when `hash` encodes a page identifier directly
pub fn is_page_hash(hash: &str, config: &ViewerConfig) -> bool {
    let raw = hash.strip_prefix('#').unwrap_or(hash);
    !raw.is_empty() && config.route_prefixes.iter().any(|p| raw.starts_with(p.as_str()))
}

/// URL fragment for `page`
pub fn hash_for(page: &str) -> String {
    format!("#{}", page)
}

// =============================================================================
// History
// =============================================================================

/// State payload stored with each pushed history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub page: String,
}

impl HistoryEntry {
    pub fn new(page: impl Into<String>) -> Self {
        Self { page: page.into() }
    }

    /// Decode a popstate payload; anything that is not `{page}` is `None`
    pub fn from_js(state: JsValue) -> Option<Self> {
        if state.is_undefined() || state.is_null() {
            return None;
        }
        serde_wasm_bindgen::from_value(state).ok()
    }
}

/// Session history the navigator records into
pub trait HistoryBackend {
    /// Push a new entry with `entry` as state and `url` as the address
    fn push(&mut self, entry: &HistoryEntry, url: &str) -> Result<(), ViewerError>;

    /// Current address-bar fragment, including the leading `#` if any
    fn current_hash(&self) -> String;
}

/// `window.history` / `window.location`
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserHistory;

impl HistoryBackend for BrowserHistory {
    fn push(&mut self, entry: &HistoryEntry, url: &str) -> Result<(), ViewerError> {
        let window = web_sys::window().ok_or_else(|| ViewerError::MissingTarget("window".into()))?;
        let state = serde_wasm_bindgen::to_value(entry)
            .map_err(|e| ViewerError::Dom(format!("History state: {}", e)))?;
        window
            .history()
            .map_err(ViewerError::from_js)?
            .push_state_with_url(&state, "", Some(url))
            .map_err(ViewerError::from_js)
    }

    fn current_hash(&self) -> String {
        let hash = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default();
        // Spaces and other escapes come back percent-encoded
        js_sys::decode_uri(&hash)
            .map(String::from)
            .unwrap_or(hash)
    }
}

/// In-memory history stack with a cursor
///
/// Mirrors the browser model: `push` drops forward entries, `back` and
/// `forward` move the cursor and return the state payload the browser
/// would hand to a popstate listener.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<(Option<HistoryEntry>, String)>,
    cursor: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryHistory {
    /// Start with one payload-less entry at `hash` (the initial page load)
    pub fn new(hash: &str) -> Self {
        Self {
            entries: vec![(None, hash.to_string())],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the initial entry is never dropped. Kept alongside `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn back(&mut self) -> Option<Option<HistoryEntry>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].0.clone())
    }

    pub fn forward(&mut self) -> Option<Option<HistoryEntry>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].0.clone())
    }
}

impl HistoryBackend for MemoryHistory {
    fn push(&mut self, entry: &HistoryEntry, url: &str) -> Result<(), ViewerError> {
        self.entries.truncate(self.cursor + 1);
        self.entries.push((Some(entry.clone()), url.to_string()));
        self.cursor = self.entries.len() - 1;
        Ok(())
    }

    fn current_hash(&self) -> String {
        self.entries[self.cursor].1.clone()
    }
}

// =============================================================================
// Navigator
// =============================================================================

/// Handle for one in-flight navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    pub generation: u64,
    pub page: String,
    pub record: bool,
}

pub struct Navigator<H: HistoryBackend> {
    history: H,
    config: ViewerConfig,
    generation: u64,
    current: Option<String>,
}

impl<H: HistoryBackend> Navigator<H> {
    pub fn new(history: H, config: ViewerConfig) -> Self {
        Self {
            history,
            config,
            generation: 0,
            current: None,
        }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// Page encoded in the address bar, or the default page
    pub fn current_route(&self) -> String {
        route_from_hash(&self.history.current_hash(), &self.config)
    }

    /// Last committed page
    pub fn current_page(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a navigation; supersedes every ticket issued before it
    pub fn begin(&mut self, page: &str, record: bool) -> NavigationTicket {
        self.generation += 1;
        NavigationTicket {
            generation: self.generation,
            page: page.to_string(),
            record,
        }
    }

    /// Back/forward replay: payload page, else the re-derived route; never records
    pub fn pop_state(&mut self, payload: Option<HistoryEntry>) -> NavigationTicket {
        let page = match payload {
            Some(entry) => entry.page,
            None => self.current_route(),
        };
        self.begin(&page, false)
    }

    pub fn is_current(&self, ticket: &NavigationTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a resolved navigation. Returns false for stale tickets.
    pub fn commit(&mut self, ticket: &NavigationTicket) -> Result<bool, ViewerError> {
        if !self.is_current(ticket) {
            return Ok(false);
        }
        if ticket.record {
            self.history
                .push(&HistoryEntry::new(ticket.page.clone()), &hash_for(&ticket.page))?;
        }
        self.current = Some(ticket.page.clone());
        Ok(true)
    }
}
