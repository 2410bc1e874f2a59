#![forbid(unsafe_code)]

//! URL fragment and session history.
//!
//! Overlay widgets deep-link through the URL fragment: `#<id>` means "this
//! modal is open", no fragment means "nothing is open". [`Navigation`] is the
//! narrow surface they need; [`MemoryHistory`] implements it over an
//! in-memory entry stack with browser `pushState`/`replaceState`/`popstate`
//! semantics.
//!
//! # Invariants
//!
//! 1. `push` discards every entry after the current one before appending.
//! 2. `replace` never changes the number of entries.
//! 3. Pop-state fires only on traversal (`back`/`forward`/`go`), never on
//!    push or replace, and carries the target entry's state.
//!
//! # Failure Modes
//!
//! - Traversal past either end is a no-op and fires nothing.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::emitter::{Emitter, Subscription};

/// State payload stored with a history entry (`{ "modal": id }`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryState {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub modal: Option<String>,
}

impl HistoryState {
    pub fn modal(id: impl Into<String>) -> Self {
        Self {
            modal: Some(id.into()),
        }
    }
}

/// Delivered to pop-state handlers after traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopState {
    /// State of the entry traversed to.
    pub state: Option<HistoryState>,
    /// Fragment of the entry traversed to, without `#`.
    pub fragment: String,
}

/// Navigation collaborator consumed by the modal manager.
pub trait Navigation {
    /// Current fragment without the leading `#`; empty when absent.
    fn fragment(&self) -> String;

    /// State attached to the current entry.
    fn state(&self) -> Option<HistoryState>;

    /// Push a new entry with state `{modal: id}` and fragment `#id`.
    fn push_modal_state(&self, id: &str);

    /// Replace the current entry with an empty state and no fragment.
    fn clear_fragment(&self);

    /// Register a pop-state handler.
    fn on_pop_state(&self, handler: Box<dyn Fn(&PopState)>) -> Subscription;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    path: String,
    fragment: String,
    state: Option<HistoryState>,
}

impl Entry {
    fn url(&self) -> String {
        if self.fragment.is_empty() {
            self.path.clone()
        } else {
            format!("{}#{}", self.path, self.fragment)
        }
    }
}

struct HistoryInner {
    entries: Vec<Entry>,
    index: usize,
}

/// In-memory session history.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Rc<RefCell<HistoryInner>>,
    pop_state: Emitter<PopState>,
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemoryHistory")
            .field("url", &inner.entries[inner.index].url())
            .field("index", &inner.index)
            .field("len", &inner.entries.len())
            .finish()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryHistory {
    /// Start a session at `url` (`/page` or `/page#fragment`).
    #[must_use]
    pub fn new(url: &str) -> Self {
        let (path, fragment) = split_url(url);
        Self {
            inner: Rc::new(RefCell::new(HistoryInner {
                entries: vec![Entry {
                    path,
                    fragment,
                    state: None,
                }],
                index: 0,
            })),
            pop_state: Emitter::new(),
        }
    }

    /// `history.pushState(state, "", url)`.
    pub fn push(&self, state: Option<HistoryState>, url: &str) {
        let mut inner = self.inner.borrow_mut();
        let entry = inner.resolve(url, state);
        let next = inner.index + 1;
        inner.entries.truncate(next);
        inner.entries.push(entry);
        inner.index = next;
    }

    /// `history.replaceState(state, "", url)`.
    pub fn replace(&self, state: Option<HistoryState>, url: &str) {
        let mut inner = self.inner.borrow_mut();
        let entry = inner.resolve(url, state);
        let idx = inner.index;
        inner.entries[idx] = entry;
    }

    /// Set the fragment of the current entry without firing anything, like
    /// the user editing the address bar before the page loads.
    pub fn set_fragment(&self, fragment: &str) {
        let mut inner = self.inner.borrow_mut();
        let idx = inner.index;
        inner.entries[idx].fragment = fragment.trim_start_matches('#').to_owned();
    }

    pub fn back(&self) -> bool {
        self.go(-1)
    }

    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Traverse by `delta` entries and fire pop-state. Returns whether the
    /// index moved.
    pub fn go(&self, delta: isize) -> bool {
        let event = {
            let mut inner = self.inner.borrow_mut();
            let Some(target) = inner.index.checked_add_signed(delta) else {
                return false;
            };
            if delta == 0 || target >= inner.entries.len() {
                return false;
            }
            inner.index = target;
            let entry = &inner.entries[target];
            PopState {
                state: entry.state.clone(),
                fragment: entry.fragment.clone(),
            }
        };
        tracing::debug!(delta, fragment = %event.fragment, "history traversal");
        self.pop_state.emit(&event);
        true
    }

    /// Full URL of the current entry.
    pub fn url(&self) -> String {
        let inner = self.inner.borrow();
        inner.entries[inner.index].url()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.inner.borrow().index
    }
}

impl HistoryInner {
    fn resolve(&self, url: &str, state: Option<HistoryState>) -> Entry {
        let current = &self.entries[self.index];
        // Fragment-only and empty URLs stay on the current path.
        let (path, fragment) = if url.is_empty() || url.starts_with('#') {
            (current.path.clone(), url.trim_start_matches('#').to_owned())
        } else {
            split_url(url)
        };
        Entry {
            path,
            fragment,
            state,
        }
    }
}

fn split_url(url: &str) -> (String, String) {
    match url.split_once('#') {
        Some((path, fragment)) => (normalize_path(path), fragment.to_owned()),
        None => (normalize_path(url), String::new()),
    }
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_owned()
    } else {
        path.to_owned()
    }
}

impl Navigation for MemoryHistory {
    fn fragment(&self) -> String {
        let inner = self.inner.borrow();
        inner.entries[inner.index].fragment.clone()
    }

    fn state(&self) -> Option<HistoryState> {
        let inner = self.inner.borrow();
        inner.entries[inner.index].state.clone()
    }

    fn push_modal_state(&self, id: &str) {
        self.push(Some(HistoryState::modal(id)), &format!("#{id}"));
    }

    fn clear_fragment(&self) {
        let path = {
            let inner = self.inner.borrow();
            inner.entries[inner.index].path.clone()
        };
        self.replace(Some(HistoryState::default()), &path);
    }

    fn on_pop_state(&self, handler: Box<dyn Fn(&PopState)>) -> Subscription {
        self.pop_state.subscribe(move |event| handler(event))
    }
}
