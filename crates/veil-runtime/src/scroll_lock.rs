#![forbid(unsafe_code)]

//! Page scroll locking while an overlay is shown.
//!
//! [`BodyScrollLock`] freezes the page by pinning `<body>` at its current
//! scroll offset and compensating for the vanished scrollbar with right
//! padding on the body and every `.fixed-block` element.
//!
//! # Invariants
//!
//! 1. Both operations are idempotent, keyed off the `dis-scroll` body class.
//! 2. `enable_scroll` restores the offset recorded by the matching
//!    `disable_scroll`.

use std::cell::Cell;
use std::fmt;

use veil_core::dom::{Selector, SharedDocument};
use veil_core::markup::{FIXED_BLOCK_CLASS, SCROLL_LOCK_CLASS, SCROLL_POSITION_ATTR};

/// Scroll-lock collaborator consumed by overlay widgets.
pub trait ScrollLock {
    fn disable_scroll(&self);
    fn enable_scroll(&self);
    fn is_locked(&self) -> bool;
}

/// Host-reported viewport metrics.
#[derive(Debug, Default)]
pub struct Viewport {
    scroll_y: Cell<i32>,
    inner_width: Cell<i32>,
    body_width: Cell<i32>,
}

impl Viewport {
    pub fn new(inner_width: i32, body_width: i32) -> Self {
        let viewport = Self::default();
        viewport.set_widths(inner_width, body_width);
        viewport
    }

    pub fn scroll_y(&self) -> i32 {
        self.scroll_y.get()
    }

    pub fn scroll_to(&self, y: i32) {
        self.scroll_y.set(y.max(0));
    }

    pub fn set_widths(&self, inner_width: i32, body_width: i32) {
        self.inner_width.set(inner_width);
        self.body_width.set(body_width);
    }

    /// Width taken by the vertical scrollbar.
    pub fn scrollbar_width(&self) -> i32 {
        (self.inner_width.get() - self.body_width.get()).max(0)
    }
}

/// Scroll lock acting on the document body.
pub struct BodyScrollLock {
    document: SharedDocument,
    viewport: Viewport,
}

impl fmt::Debug for BodyScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyScrollLock")
            .field("viewport", &self.viewport)
            .field("locked", &self.is_locked())
            .finish()
    }
}

impl BodyScrollLock {
    pub fn new(document: SharedDocument, viewport: Viewport) -> Self {
        Self { document, viewport }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

impl ScrollLock for BodyScrollLock {
    fn disable_scroll(&self) {
        let mut doc = self.document.borrow_mut();
        let body = doc.body();
        if doc.has_class(body, SCROLL_LOCK_CLASS) {
            return;
        }
        let scroll_y = self.viewport.scroll_y();
        let padding = format!("{}px", self.viewport.scrollbar_width());

        let html = doc.document_element();
        doc.set_style(html, "scroll-behavior", "auto");
        for fixed in doc.query_all(html, &Selector::class(FIXED_BLOCK_CLASS)) {
            doc.set_style(fixed, "padding-right", padding.as_str());
        }
        doc.set_style(body, "padding-right", padding);
        doc.set_style(body, "top", format!("-{scroll_y}px"));
        doc.set_attribute(body, SCROLL_POSITION_ATTR, scroll_y.to_string());
        doc.add_class(body, SCROLL_LOCK_CLASS);
        tracing::trace!(scroll_y, "scroll locked");
    }

    fn enable_scroll(&self) {
        let position = {
            let mut doc = self.document.borrow_mut();
            let body = doc.body();
            if !doc.has_class(body, SCROLL_LOCK_CLASS) {
                return;
            }
            let position = doc
                .attribute(body, SCROLL_POSITION_ATTR)
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(0);

            let html = doc.document_element();
            for fixed in doc.query_all(html, &Selector::class(FIXED_BLOCK_CLASS)) {
                doc.set_style(fixed, "padding-right", "0px");
            }
            doc.set_style(body, "padding-right", "0px");
            doc.remove_style(body, "top");
            doc.remove_class(body, SCROLL_LOCK_CLASS);
            doc.remove_attribute(body, SCROLL_POSITION_ATTR);
            doc.remove_style(html, "scroll-behavior");
            position
        };
        self.viewport.scroll_to(position);
        tracing::trace!(position, "scroll unlocked");
    }

    fn is_locked(&self) -> bool {
        let doc = self.document.borrow();
        doc.has_class(doc.body(), SCROLL_LOCK_CLASS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::dom::Document;

    fn setup() -> (BodyScrollLock, SharedDocument, veil_core::NodeId) {
        let mut doc = Document::new();
        let header = doc.append_element(doc.body(), "header");
        doc.add_class(header, FIXED_BLOCK_CLASS);
        let doc = doc.into_shared();
        let lock = BodyScrollLock::new(std::rc::Rc::clone(&doc), Viewport::new(1280, 1265));
        (lock, doc, header)
    }

    #[test]
    fn disable_pins_body_and_pads_fixed_blocks() {
        let (lock, doc, header) = setup();
        lock.viewport().scroll_to(420);
        lock.disable_scroll();

        let d = doc.borrow();
        let body = d.body();
        assert!(d.has_class(body, SCROLL_LOCK_CLASS));
        assert_eq!(d.style(body, "top"), Some("-420px"));
        assert_eq!(d.style(body, "padding-right"), Some("15px"));
        assert_eq!(d.style(header, "padding-right"), Some("15px"));
        assert_eq!(d.attribute(body, SCROLL_POSITION_ATTR), Some("420"));
        assert_eq!(d.style(d.document_element(), "scroll-behavior"), Some("auto"));
    }

    #[test]
    fn enable_restores_scroll_position() {
        let (lock, doc, header) = setup();
        lock.viewport().scroll_to(300);
        lock.disable_scroll();
        // Host scroll events while locked don't move the saved offset.
        lock.viewport().scroll_to(0);
        lock.enable_scroll();

        assert_eq!(lock.viewport().scroll_y(), 300);
        let d = doc.borrow();
        let body = d.body();
        assert!(!d.has_class(body, SCROLL_LOCK_CLASS));
        assert_eq!(d.style(body, "top"), None);
        assert_eq!(d.attribute(body, SCROLL_POSITION_ATTR), None);
        assert_eq!(d.style(header, "padding-right"), Some("0px"));
        assert_eq!(d.style(d.document_element(), "scroll-behavior"), None);
    }

    #[test]
    fn operations_are_idempotent() {
        let (lock, _doc, _) = setup();
        lock.viewport().scroll_to(100);
        lock.disable_scroll();
        lock.viewport().scroll_to(999);
        lock.disable_scroll();
        assert!(lock.is_locked());

        lock.enable_scroll();
        lock.viewport().scroll_to(5);
        lock.enable_scroll();
        assert!(!lock.is_locked());
        assert_eq!(lock.viewport().scroll_y(), 5);
    }
}
