#![allow(dead_code)]

//! Shared page fixture and host loop for modal integration tests.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer};
use veil_core::dom::{Document, NodeId, SharedDocument};
use veil_core::event::{Event, EventOutcome, KeyCode};
use veil_core::markup::{
    ACTIVE_CLASS, CLOSE_CLASS, FIXED_BLOCK_CLASS, INNER_TRIGGER_ATTR, OPEN_TRIGGER_ATTR,
    OVERLAY_ATTR, POPUP_ATTR,
};
use veil_runtime::{BodyScrollLock, FadeAnimator, MemoryHistory, TransitionClock, Viewport};
use veil_widgets::modal::{CloseOptions, ModalConfig, ModalHost, ModalManager};

/// Node handles of the fixture page.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub overlay: NodeId,
    pub modal_a: NodeId,
    pub modal_b: NodeId,
    /// `.close` button inside `modal_a`.
    pub close_a: NodeId,
    /// Plain paragraph inside `modal_a`.
    pub text_a: NodeId,
    /// `[data-btn-inner="modal_b"]` inside `modal_a`.
    pub inner_to_b: NodeId,
    pub open_a: NodeId,
    /// Icon nested in `open_a`.
    pub open_a_icon: NodeId,
    pub open_b: NodeId,
    /// `<a href="/modal_b">`.
    pub link_b: NodeId,
    /// `<a href="#modal_a">`.
    pub hash_a: NodeId,
    /// `<a href="#top">`.
    pub top_link: NodeId,
    pub header: NodeId,
}

pub fn build_page(doc: &mut Document) -> Page {
    let body = doc.body();
    let header = doc.append_element(body, "header");
    doc.add_class(header, FIXED_BLOCK_CLASS);

    let open_a = doc.append_element(header, "button");
    doc.set_attribute(open_a, OPEN_TRIGGER_ATTR, "modal_a");
    let open_a_icon = doc.append_element(open_a, "span");
    let open_b = doc.append_element(header, "button");
    doc.set_attribute(open_b, OPEN_TRIGGER_ATTR, "modal_b");

    let link_b = doc.append_element(body, "a");
    doc.set_attribute(link_b, "href", "/modal_b");
    let hash_a = doc.append_element(body, "a");
    doc.set_attribute(hash_a, "href", "#modal_a");
    let top_link = doc.append_element(body, "a");
    doc.set_attribute(top_link, "href", "#top");

    let overlay = doc.append_element(body, "div");
    doc.set_attribute(overlay, OVERLAY_ATTR, "");

    let modal_a = doc.append_element(overlay, "div");
    doc.set_attribute(modal_a, POPUP_ATTR, "modal_a");
    let close_a = doc.append_element(modal_a, "button");
    doc.add_class(close_a, CLOSE_CLASS);
    let text_a = doc.append_element(modal_a, "p");
    let inner_to_b = doc.append_element(modal_a, "button");
    doc.set_attribute(inner_to_b, INNER_TRIGGER_ATTR, "modal_b");

    let modal_b = doc.append_element(overlay, "div");
    doc.set_attribute(modal_b, POPUP_ATTR, "modal_b");

    Page {
        overlay,
        modal_a,
        modal_b,
        close_a,
        text_a,
        inner_to_b,
        open_a,
        open_a_icon,
        open_b,
        link_b,
        hash_a,
        top_link,
        header,
    }
}

/// A manager over the fixture page plus the host loop driving it.
pub struct Harness {
    pub page: Page,
    pub doc: SharedDocument,
    pub clock: TransitionClock,
    pub history: Rc<MemoryHistory>,
    pub scroll: Rc<BodyScrollLock>,
    pub pool: LocalPool,
    pub manager: ModalManager,
}

impl Harness {
    pub fn new(config: ModalConfig) -> Self {
        Self::with_page("/", config, |_, _| {})
    }

    /// Build at `url`, letting `customize` touch the page before the manager
    /// sees it.
    pub fn with_page(
        url: &str,
        config: ModalConfig,
        customize: impl FnOnce(&mut Document, &Page),
    ) -> Self {
        let mut doc = Document::new();
        let page = build_page(&mut doc);
        customize(&mut doc, &page);
        let doc = doc.into_shared();

        let clock = TransitionClock::new();
        let history = Rc::new(MemoryHistory::new(url));
        let scroll = Rc::new(BodyScrollLock::new(
            Rc::clone(&doc),
            Viewport::new(1280, 1265),
        ));
        let pool = LocalPool::new();
        let host = ModalHost::new(
            Rc::new(FadeAnimator::new(Rc::clone(&doc), clock.clone())),
            scroll.clone(),
            history.clone(),
            Rc::new(pool.spawner()),
        );
        let manager = ModalManager::new(Rc::clone(&doc), host, config);
        Self {
            page,
            doc,
            clock,
            history,
            scroll,
            pool,
            manager,
        }
    }

    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        self.pool
            .spawner()
            .spawn_local(future)
            .expect("spawn on local pool");
    }

    /// Run tasks and advance time until nothing is pending.
    pub fn settle(&mut self) {
        for _ in 0..256 {
            self.pool.run_until_stalled();
            if self.clock.pending() == 0 {
                break;
            }
            self.clock.advance(Duration::from_millis(50));
        }
        self.pool.run_until_stalled();
    }

    /// Run ready tasks and advance time by `dt` once.
    pub fn step(&mut self, dt: Duration) {
        self.pool.run_until_stalled();
        self.clock.advance(dt);
        self.pool.run_until_stalled();
    }

    pub fn open(&mut self, id: &str) -> bool {
        let result = self.open_deferred(id);
        self.settle();
        result.get().expect("open did not settle")
    }

    /// Spawn an open without driving it; the cell fills when it resolves.
    pub fn open_deferred(&self, id: &str) -> Rc<Cell<Option<bool>>> {
        let result = Rc::new(Cell::new(None));
        let slot = Rc::clone(&result);
        let manager = self.manager.clone();
        let id = id.to_owned();
        self.spawn(async move {
            slot.set(Some(manager.open_modal(&id).await));
        });
        result
    }

    pub fn close(&mut self, options: CloseOptions) {
        let manager = self.manager.clone();
        self.spawn(async move {
            manager.close_all_modals(options).await;
        });
        self.settle();
    }

    pub fn click(&self, target: NodeId) -> EventOutcome {
        self.manager.handle_event(&Event::click(target))
    }

    pub fn key(&self, code: KeyCode) -> EventOutcome {
        self.manager.handle_event(&Event::key(code))
    }

    pub fn is_active(&self, node: NodeId) -> bool {
        self.doc.borrow().has_class(node, ACTIVE_CLASS)
    }

    pub fn overlay_active(&self) -> bool {
        self.is_active(self.page.overlay)
    }

    pub fn active_modals(&self) -> Vec<NodeId> {
        [self.page.modal_a, self.page.modal_b]
            .into_iter()
            .filter(|&m| self.is_active(m))
            .collect()
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.doc.borrow().attribute(node, name).map(str::to_owned)
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.doc.borrow().style(node, property).map(str::to_owned)
    }
}

/// A log line captured by [`CaptureLayer`].
#[derive(Debug, Clone)]
pub struct Captured {
    pub level: tracing::Level,
    pub message: String,
    pub fields: String,
}

/// Records every event into a shared buffer.
#[derive(Clone, Default)]
pub struct CaptureLayer {
    pub events: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureLayer {
    pub fn take(&self) -> Vec<Captured> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

#[derive(Default)]
struct Fields {
    message: String,
    rest: String,
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.rest.push_str(&format!("{}={:?} ", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            self.rest.push_str(&format!("{}={} ", field.name(), value));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        self.events.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            message: fields.message,
            fields: fields.rest,
        });
    }
}
