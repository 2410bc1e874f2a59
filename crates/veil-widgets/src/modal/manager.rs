#![forbid(unsafe_code)]

//! The modal lifecycle manager.
//!
//! One overlay element backdrops every modal surface registered under it.
//! [`ModalManager`] owns the open/close protocol: animated transitions,
//! mutual exclusion, URL fragment deep-linking, ordered hooks, and the
//! animation lock that rejects overlapping requests.
//!
//! # Invariants
//!
//! 1. At most one modal carries the active class at any settled point.
//! 2. The overlay is active iff a modal is open (or being kept open across
//!    a swap).
//! 3. The animation lock is held only for the duration of one open or close
//!    sequence and is released on every exit path, including a dropped
//!    future.
//! 4. The fragment names the open modal while one is open and is cleared
//!    when none is.
//!
//! # State machine
//!
//! ```text
//! Closed --open--> Opening --fade-in settles--> Open
//! Open --close/escape/backdrop/popstate--> Closing --fade-out settles--> Closed
//! Open(a) --open(b)--> [forced Closing(a), overlay kept] --> Opening(b)
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | No overlay in the document | Error logged, manager is inert |
//! | Unknown modal id | Error logged, `open_modal` returns `false` |
//! | Request during a transition | Rejected, logged at debug |
//! | Hook returns `Err` | Logged, transition continues |
//! | Pop-state names a missing modal | Forced close of everything |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use futures::future::join_all;
use futures::task::{LocalSpawn, LocalSpawnExt};
use tracing::Instrument;
use veil_core::dom::{NodeId, Selector, SharedDocument};
use veil_core::event::{Event, EventOutcome, KeyCode, MouseEventKind};
use veil_core::markup::{
    ACTIVE_CLASS, ARIA_EXPANDED, ARIA_HIDDEN, CLOSE_CLASS, OPEN_TRIGGER_ATTR, OVERLAY_ATTR,
    OVERLAY_MODE_ATTR, POPUP_ATTR,
};
use veil_runtime::emitter::{Emitter, Subscription};
use veil_runtime::navigation::{Navigation, PopState};
use veil_runtime::scroll_lock::ScrollLock;
use veil_runtime::transition::Animator;

use crate::modal::config::{CloseOptions, ModalConfig, ModalOptions};
use crate::modal::events::{ModalEvent, ModalEventKind};
use crate::modal::hooks::{Hook, HookContext, HookName, HookRegistry, HookVerdict};
use crate::modal::trigger::{self, Trigger};

/// Display value a modal fades in with.
const MODAL_DISPLAY: &str = "flex";

/// Error resolving the manager or one of its modals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalError {
    /// The document has no `[data-overlay]` element.
    OverlayNotFound,
    /// No `[data-popup]` with this id under the overlay.
    UnknownModal(String),
    /// The manager was built without an overlay.
    Inert,
}

impl fmt::Display for ModalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverlayNotFound => write!(f, "overlay element [{OVERLAY_ATTR}] not found"),
            Self::UnknownModal(id) => {
                write!(f, "modal {id:?} not found inside [{OVERLAY_ATTR}]")
            }
            Self::Inert => write!(f, "modal manager is inert (no overlay)"),
        }
    }
}

impl std::error::Error for ModalError {}

/// Collaborators the manager drives.
#[derive(Clone)]
pub struct ModalHost {
    pub animator: Rc<dyn Animator>,
    pub scroll_lock: Rc<dyn ScrollLock>,
    pub navigation: Rc<dyn Navigation>,
    /// Runs transitions started by events (clicks, keys, pop-state).
    pub spawner: Rc<dyn LocalSpawn>,
}

impl ModalHost {
    pub fn new(
        animator: Rc<dyn Animator>,
        scroll_lock: Rc<dyn ScrollLock>,
        navigation: Rc<dyn Navigation>,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Self {
        Self {
            animator,
            scroll_lock,
            navigation,
            spawner,
        }
    }
}

impl fmt::Debug for ModalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHost")
            .field("scroll_locked", &self.scroll_lock.is_locked())
            .field("fragment", &self.navigation.fragment())
            .finish_non_exhaustive()
    }
}

/// Holds the animation lock for one sequence.
///
/// A forced close started while another sequence holds the lock runs
/// without owning it and leaves the lock to its owner.
struct LockGuard<'a> {
    flag: &'a Cell<bool>,
    owned: bool,
}

impl<'a> LockGuard<'a> {
    fn try_acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self { flag, owned: true })
    }

    fn acquire_forced(flag: &'a Cell<bool>) -> Self {
        let owned = !flag.replace(true);
        Self { flag, owned }
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if self.owned {
            self.flag.set(false);
        }
    }
}

#[derive(Debug, Default)]
struct State {
    current: Option<(String, NodeId)>,
    /// Mode class currently on the overlay, if any.
    applied_mode: Option<String>,
    /// Modals a close sequence is fading out.
    fading_out: Vec<NodeId>,
    /// Bumped by every close that releases the overlay.
    close_epoch: u64,
}

/// Marks modals as fading out until dropped.
struct FadingGuard<'a> {
    state: &'a RefCell<State>,
    nodes: Vec<NodeId>,
}

impl<'a> FadingGuard<'a> {
    fn claim(state: &'a RefCell<State>, nodes: Vec<NodeId>) -> Self {
        state.borrow_mut().fading_out.extend(nodes.iter().copied());
        Self { state, nodes }
    }
}

impl Drop for FadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .borrow_mut()
            .fading_out
            .retain(|node| !self.nodes.contains(node));
    }
}

struct Inner {
    document: SharedDocument,
    overlay: Option<NodeId>,
    /// Registered modals in document order.
    modals: Vec<(String, NodeId)>,
    by_id: AHashMap<String, NodeId>,
    options: ModalOptions,
    hooks: RefCell<HookRegistry>,
    state: RefCell<State>,
    animating: Cell<bool>,
    events: Emitter<ModalEvent>,
    host: ModalHost,
    pop_state: RefCell<Option<Subscription>>,
}

/// Coordinates modal surfaces under a shared overlay.
///
/// Cheap to clone; clones share state.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use futures::executor::LocalPool;
/// use futures::task::LocalSpawnExt;
/// use veil_core::dom::Document;
/// use veil_core::markup::{OVERLAY_ATTR, POPUP_ATTR};
/// use veil_runtime::{BodyScrollLock, FadeAnimator, MemoryHistory, TransitionClock, Viewport};
/// use veil_widgets::modal::{ModalConfig, ModalHost, ModalManager};
///
/// let mut doc = Document::new();
/// let overlay = doc.append_element(doc.body(), "div");
/// doc.set_attribute(overlay, OVERLAY_ATTR, "");
/// let popup = doc.append_element(overlay, "div");
/// doc.set_attribute(popup, POPUP_ATTR, "modal_a");
/// let doc = doc.into_shared();
///
/// let clock = TransitionClock::new();
/// let history = Rc::new(MemoryHistory::new("/"));
/// let mut pool = LocalPool::new();
/// let host = ModalHost::new(
///     Rc::new(FadeAnimator::new(Rc::clone(&doc), clock.clone())),
///     Rc::new(BodyScrollLock::new(Rc::clone(&doc), Viewport::new(1024, 1024))),
///     history.clone(),
///     Rc::new(pool.spawner()),
/// );
/// let manager = ModalManager::new(doc, host, ModalConfig::new());
///
/// let m = manager.clone();
/// pool.spawner()
///     .spawn_local(async move {
///         m.open_modal("modal_a").await;
///     })
///     .unwrap();
/// pool.run_until_stalled();
/// clock.advance(std::time::Duration::from_millis(300));
/// pool.run_until_stalled();
///
/// assert_eq!(manager.current_modal().as_deref(), Some("modal_a"));
/// assert_eq!(history.url(), "/#modal_a");
/// ```
#[derive(Clone)]
pub struct ModalManager {
    inner: Rc<Inner>,
}

impl fmt::Debug for ModalManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ModalManager")
            .field("overlay", &self.inner.overlay)
            .field("modals", &self.inner.modals.len())
            .field("current", &state.current)
            .field("animating", &self.inner.animating.get())
            .finish()
    }
}

impl ModalManager {
    /// Discover the overlay and its modals, wire pop-state, and sync with the
    /// current fragment.
    ///
    /// Without an overlay the error is logged and the returned manager is
    /// inert: nothing can open and every event is ignored.
    pub fn new(document: SharedDocument, host: ModalHost, config: ModalConfig) -> Self {
        match Self::try_new(Rc::clone(&document), host.clone(), config.clone()) {
            Ok(manager) => manager,
            Err(err) => {
                tracing::error!(error = %err, "modal manager disabled");
                Self::build(document, host, config, None)
            }
        }
    }

    /// Like [`ModalManager::new`], but reports a missing overlay.
    pub fn try_new(
        document: SharedDocument,
        host: ModalHost,
        config: ModalConfig,
    ) -> Result<Self, ModalError> {
        let overlay = {
            let doc = document.borrow();
            doc.query(doc.document_element(), &Selector::attr(OVERLAY_ATTR))
        }
        .ok_or(ModalError::OverlayNotFound)?;

        let manager = Self::build(document, host, config, Some(overlay));
        manager.connect();
        Ok(manager)
    }

    fn build(
        document: SharedDocument,
        host: ModalHost,
        config: ModalConfig,
        overlay: Option<NodeId>,
    ) -> Self {
        let mut modals = Vec::new();
        let mut by_id = AHashMap::new();
        if let Some(overlay) = overlay {
            let doc = document.borrow();
            for node in doc.query_all(overlay, &Selector::attr(POPUP_ATTR)) {
                let Some(id) = doc.attribute(node, POPUP_ATTR).filter(|id| !id.is_empty()) else {
                    continue;
                };
                // First surface with a given id wins.
                if !by_id.contains_key(id) {
                    by_id.insert(id.to_owned(), node);
                    modals.push((id.to_owned(), node));
                }
            }
            if modals.is_empty() {
                tracing::warn!("no modals found inside [{OVERLAY_ATTR}]");
            }
        }

        let ModalConfig { options, hooks } = config;
        Self {
            inner: Rc::new(Inner {
                document,
                overlay,
                modals,
                by_id,
                options: options.normalized(),
                hooks: RefCell::new(HookRegistry::new(hooks)),
                state: RefCell::new(State::default()),
                animating: Cell::new(false),
                events: Emitter::new(),
                host,
                pop_state: RefCell::new(None),
            }),
        }
    }

    fn connect(&self) {
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let subscription = self
            .inner
            .host
            .navigation
            .on_pop_state(Box::new(move |event| {
                if let Some(inner) = weak.upgrade() {
                    ModalManager { inner }.handle_pop_state(event);
                }
            }));
        *self.inner.pop_state.borrow_mut() = Some(subscription);

        let fragment = self.inner.host.navigation.fragment();
        if self.inner.by_id.contains_key(fragment.as_str()) {
            tracing::debug!(modal = %fragment, "opening modal from initial fragment");
            let manager = self.clone();
            self.spawn("initial-open", async move {
                manager.open_modal(&fragment).await;
            });
        } else {
            self.set_aria_all_hidden();
        }
    }

    // --- Queries ---

    pub fn is_inert(&self) -> bool {
        self.inner.overlay.is_none()
    }

    pub fn overlay(&self) -> Option<NodeId> {
        self.inner.overlay
    }

    pub fn options(&self) -> &ModalOptions {
        &self.inner.options
    }

    /// Registered modal ids in document order.
    pub fn modal_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.modals.iter().map(|(id, _)| id.as_str())
    }

    pub fn modal_node(&self, id: &str) -> Option<NodeId> {
        self.inner.by_id.get(id).copied()
    }

    /// Id of the modal currently open.
    pub fn current_modal(&self) -> Option<String> {
        self.inner
            .state
            .borrow()
            .current
            .as_ref()
            .map(|(id, _)| id.clone())
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.inner
            .state
            .borrow()
            .current
            .as_ref()
            .is_some_and(|(current, _)| current == id)
    }

    /// Whether an open or close sequence holds the animation lock.
    pub fn is_animating(&self) -> bool {
        self.inner.animating.get()
    }

    pub fn document(&self) -> &SharedDocument {
        &self.inner.document
    }

    fn resolve(&self, id: &str) -> Result<NodeId, ModalError> {
        if self.is_inert() {
            return Err(ModalError::Inert);
        }
        self.modal_node(id)
            .ok_or_else(|| ModalError::UnknownModal(id.to_owned()))
    }

    // --- Hooks and listeners ---

    /// Install the per-call hook for `name`, replacing any previous one.
    pub fn on(&self, name: HookName, hook: Hook) -> &Self {
        self.inner.hooks.borrow_mut().on(name, hook);
        self
    }

    /// Install a per-call hook that is removed once its phase fires.
    pub fn once(&self, name: HookName, hook: Hook) -> &Self {
        self.inner.hooks.borrow_mut().once(name, hook);
        self
    }

    /// Remove the per-call hook for `name`. Global hooks are unaffected.
    pub fn off(&self, name: HookName) -> &Self {
        self.inner.hooks.borrow_mut().off(name);
        self
    }

    /// Observe lifecycle events. Dropping the subscription stops delivery.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&ModalEvent) + 'static) -> Subscription {
        self.inner.events.subscribe(listener)
    }

    // --- Protocol ---

    /// Open `id`, swapping out any visible modal. Resolves once the fade-in
    /// settles.
    ///
    /// Returns `false` when `id` is unknown, another transition is running,
    /// or a `BeforeOpen` hook cancels.
    pub async fn open_modal(&self, id: &str) -> bool {
        let modal = match self.resolve(id) {
            Ok(modal) => modal,
            Err(err) => {
                tracing::error!(error = %err, "cannot open modal");
                return false;
            }
        };
        let Some(_lock) = LockGuard::try_acquire(&self.inner.animating) else {
            tracing::debug!(modal = id, "open rejected: transition in progress");
            return false;
        };
        self.open_sequence(id, modal)
            .instrument(tracing::debug_span!("modal.open", modal = id))
            .await
    }

    async fn open_sequence(&self, id: &str, modal: NodeId) -> bool {
        self.emit(ModalEventKind::BeforeOpen, id, modal);
        if self.run_hooks(HookName::BeforeOpen, id, modal).await == HookVerdict::Cancel {
            tracing::debug!("open cancelled by hook");
            return false;
        }

        if self.any_visible() {
            self.close_all_modals(CloseOptions::swap_to(id)).await;
        }

        let epoch = self.inner.state.borrow().close_epoch;
        self.activate_overlay(modal);
        self.inner
            .document
            .borrow_mut()
            .add_class(modal, ACTIVE_CLASS);

        let fade_in = self.inner.options.fade_in;
        self.inner
            .host
            .animator
            .fade_in(modal, fade_in, MODAL_DISPLAY)
            .await;

        // A forced close (pop-state) ran during the fade and owns cleanup.
        if self.inner.state.borrow().close_epoch != epoch {
            tracing::debug!("open interrupted by close");
            return false;
        }

        self.inner.host.scroll_lock.disable_scroll();
        self.inner.state.borrow_mut().current = Some((id.to_owned(), modal));

        let navigation = &self.inner.host.navigation;
        if navigation.fragment() != id {
            navigation.push_modal_state(id);
        }
        self.set_aria_open(modal);

        self.run_hooks(HookName::AfterOpen, id, modal).await;
        self.emit(ModalEventKind::AfterOpen, id, modal);
        true
    }

    /// Close every visible modal except `options.except`.
    ///
    /// Without [`CloseFlags::FORCE`](crate::modal::CloseFlags::FORCE) the
    /// call is a no-op while another transition runs. Closing cannot be
    /// cancelled.
    pub async fn close_all_modals(&self, options: CloseOptions) {
        if self.is_inert() {
            return;
        }
        let _lock = if options.force() {
            LockGuard::acquire_forced(&self.inner.animating)
        } else {
            match LockGuard::try_acquire(&self.inner.animating) {
                Some(lock) => lock,
                None => {
                    tracing::debug!("close rejected: transition in progress");
                    return;
                }
            }
        };
        let span = tracing::debug_span!(
            "modal.close",
            except = options.except.as_deref().unwrap_or(""),
            keep_overlay = options.keep_overlay(),
        );
        self.close_sequence(&options).instrument(span).await;
    }

    async fn close_sequence(&self, options: &CloseOptions) {
        let keep_overlay = options.keep_overlay();
        if !keep_overlay {
            self.inner.state.borrow_mut().close_epoch += 1;
        }

        // Modals another close is already fading out belong to that close.
        let closing: Vec<(String, NodeId)> = {
            let fading = self.inner.state.borrow().fading_out.clone();
            self.visible_modals()
                .into_iter()
                .filter(|(id, node)| {
                    options.except.as_deref() != Some(id.as_str()) && !fading.contains(node)
                })
                .collect()
        };
        let fading = FadingGuard::claim(
            &self.inner.state,
            closing.iter().map(|(_, node)| *node).collect(),
        );

        for (id, modal) in &closing {
            self.emit(ModalEventKind::BeforeClose, id, *modal);
            self.run_hooks(HookName::BeforeClose, id, *modal).await;
        }

        if !keep_overlay {
            self.deactivate_overlay();
        }

        {
            let mut doc = self.inner.document.borrow_mut();
            for (_, modal) in &closing {
                doc.remove_class(*modal, ACTIVE_CLASS);
            }
        }
        let fade_out = self.inner.options.fade_out;
        let fades: Vec<_> = closing
            .iter()
            .map(|(_, modal)| self.inner.host.animator.fade_out(*modal, fade_out))
            .collect();
        join_all(fades).await;
        drop(fading);

        if !keep_overlay {
            self.inner.host.scroll_lock.enable_scroll();
            self.inner.state.borrow_mut().current = None;
            self.set_aria_all_hidden();
            self.inner.host.navigation.clear_fragment();
        }

        for (id, modal) in &closing {
            self.run_hooks(HookName::AfterClose, id, *modal).await;
            self.emit(ModalEventKind::AfterClose, id, *modal);
        }
    }

    async fn run_hooks(&self, name: HookName, id: &str, modal: NodeId) -> HookVerdict {
        let sequence = self.inner.hooks.borrow_mut().take_sequence(name);
        for (origin, hook) in sequence {
            let ctx = HookContext {
                id: id.to_owned(),
                modal,
                manager: self.clone(),
            };
            match hook.call(ctx).await {
                Ok(HookVerdict::Proceed) => {}
                Ok(HookVerdict::Cancel) if name.is_cancellable() => return HookVerdict::Cancel,
                Ok(HookVerdict::Cancel) => {
                    tracing::debug!(hook = %name, %origin, "ignoring cancel from non-cancellable hook");
                }
                Err(err) => {
                    tracing::error!(hook = %name, %origin, modal = id, error = %err, "hook failed");
                }
            }
        }
        HookVerdict::Proceed
    }

    fn emit(&self, kind: ModalEventKind, id: &str, modal: NodeId) {
        self.inner.events.emit(&ModalEvent {
            kind,
            id: id.to_owned(),
            modal,
            manager: self.clone(),
        });
    }

    // --- DOM bookkeeping ---

    /// A modal is visible when active or shown through inline `display`.
    fn visible_modals(&self) -> Vec<(String, NodeId)> {
        let doc = self.inner.document.borrow();
        self.inner
            .modals
            .iter()
            .filter(|(_, node)| {
                doc.has_class(*node, ACTIVE_CLASS)
                    || doc.style(*node, "display").is_some_and(|d| d != "none")
            })
            .cloned()
            .collect()
    }

    fn any_visible(&self) -> bool {
        !self.visible_modals().is_empty()
    }

    /// Mode the overlay takes for `modal`: its own `data-overlay-mode`, else
    /// the configured one.
    fn mode_for(&self, modal: NodeId) -> String {
        let doc = self.inner.document.borrow();
        doc.attribute(modal, OVERLAY_MODE_ATTR)
            .map(str::trim)
            .filter(|mode| !mode.is_empty())
            .unwrap_or(self.inner.options.active_mode.as_str())
            .to_owned()
    }

    fn activate_overlay(&self, modal: NodeId) {
        let Some(overlay) = self.inner.overlay else {
            return;
        };
        let mode = self.mode_for(modal);
        let mut state = self.inner.state.borrow_mut();
        let mut doc = self.inner.document.borrow_mut();
        // Last mode wins across a swap.
        if let Some(previous) = state.applied_mode.take()
            && previous != mode
        {
            doc.remove_class(overlay, &previous);
        }
        doc.add_class(overlay, ACTIVE_CLASS);
        if !mode.is_empty() {
            doc.add_class(overlay, &mode);
            state.applied_mode = Some(mode);
        }
        doc.set_attribute(overlay, ARIA_HIDDEN, "false");
    }

    fn deactivate_overlay(&self) {
        let Some(overlay) = self.inner.overlay else {
            return;
        };
        let mut doc = self.inner.document.borrow_mut();
        doc.remove_class(overlay, ACTIVE_CLASS);
        if let Some(mode) = self.inner.state.borrow_mut().applied_mode.take() {
            doc.remove_class(overlay, &mode);
        }
        doc.set_attribute(overlay, ARIA_HIDDEN, "true");
    }

    fn set_aria_all_hidden(&self) {
        self.set_aria(None);
    }

    fn set_aria_open(&self, modal: NodeId) {
        self.set_aria(Some(modal));
    }

    fn set_aria(&self, open: Option<NodeId>) {
        let Some(overlay) = self.inner.overlay else {
            return;
        };
        let mut doc = self.inner.document.borrow_mut();
        for (_, node) in &self.inner.modals {
            let hidden = if Some(*node) == open { "false" } else { "true" };
            doc.set_attribute(*node, ARIA_HIDDEN, hidden);
        }
        let shown = if open.is_some() { "false" } else { "true" };
        doc.set_attribute(overlay, ARIA_HIDDEN, shown);

        let expanded = if open.is_some() { "true" } else { "false" };
        let root = doc.document_element();
        for button in doc.query_all(root, &Selector::attr(OPEN_TRIGGER_ATTR)) {
            doc.set_attribute(button, ARIA_EXPANDED, expanded);
        }
    }

    // --- Events ---

    /// Route a host input event. Transitions it starts run on the host
    /// spawner.
    pub fn handle_event(&self, event: &Event) -> EventOutcome {
        if self.is_inert() {
            return EventOutcome::Ignored;
        }
        match event {
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Click => {
                self.handle_click(mouse.target)
            }
            Event::Key(key) if key.code == KeyCode::Escape => self.handle_escape(),
            _ => EventOutcome::Ignored,
        }
    }

    fn handle_click(&self, target: NodeId) -> EventOutcome {
        let mut outcome = EventOutcome::Ignored;

        // Overlay listener sees the click before the document one.
        if let Some(overlay) = self.inner.overlay {
            let dismiss = {
                let doc = self.inner.document.borrow();
                doc.contains(overlay, target)
                    && ((target == overlay && self.inner.options.close_on_overlay_click)
                        || doc.has_class(target, CLOSE_CLASS))
            };
            if dismiss {
                tracing::debug!("backdrop or close control clicked");
                let manager = self.clone();
                self.spawn("dismiss", async move {
                    manager.close_all_modals(CloseOptions::all()).await;
                });
                outcome = EventOutcome::Handled {
                    prevent_default: false,
                };
            }
        }

        let found = {
            let doc = self.inner.document.borrow();
            trigger::resolve(&doc, target, |id| self.inner.by_id.contains_key(id))
        };
        if let Some(found) = found {
            tracing::debug!(modal = found.id(), kind = trigger_kind(&found), "trigger clicked");
            let manager = self.clone();
            let id = found.id().to_owned();
            self.spawn("trigger-open", async move {
                manager.open_modal(&id).await;
            });
            outcome = EventOutcome::Handled {
                prevent_default: true,
            };
        }
        outcome
    }

    fn handle_escape(&self) -> EventOutcome {
        if !self.inner.options.close_on_escape {
            return EventOutcome::Ignored;
        }
        let active = self.inner.overlay.is_some_and(|overlay| {
            self.inner
                .document
                .borrow()
                .has_class(overlay, ACTIVE_CLASS)
        });
        if !active {
            return EventOutcome::Ignored;
        }
        let manager = self.clone();
        self.spawn("escape", async move {
            manager.close_all_modals(CloseOptions::all()).await;
        });
        EventOutcome::Handled {
            prevent_default: false,
        }
    }

    /// Undo/redo through history: open the modal the entry names, or close
    /// everything when it names none (or one that no longer exists).
    fn handle_pop_state(&self, event: &PopState) {
        let id = event
            .state
            .as_ref()
            .and_then(|state| state.modal.clone())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| event.fragment.clone());

        let manager = self.clone();
        if self.inner.by_id.contains_key(id.as_str()) {
            tracing::debug!(modal = %id, "pop-state opens modal");
            self.spawn("popstate-open", async move {
                manager.open_modal(&id).await;
            });
        } else {
            tracing::debug!(modal = %id, "pop-state closes modals");
            self.spawn("popstate-close", async move {
                manager.close_all_modals(CloseOptions::forced()).await;
            });
        }
    }

    fn spawn(&self, task: &'static str, future: impl Future<Output = ()> + 'static) {
        if let Err(err) = self.inner.host.spawner.spawn_local(future) {
            tracing::error!(task, error = %err, "failed to spawn modal transition");
        }
    }
}

fn trigger_kind(trigger: &Trigger) -> &'static str {
    match trigger {
        Trigger::Open { .. } => "open",
        Trigger::Link { .. } => "link",
        Trigger::Inner { .. } => "inner",
    }
}
