#![forbid(unsafe_code)]

//! Recognition of modal triggers from a click target.
//!
//! | Shape | Markup | Routes |
//! |-------|--------|--------|
//! | Open | `[data-btn-modal="id"]` | always |
//! | Path link | `a[href^="/modal_"]` | always |
//! | Fragment link | `a[href="#id"]`, `a[href="/#id"]` | only when `id` is registered |
//! | Inner | `[data-btn-inner="id"]` | when the value is non-empty |
//!
//! Open triggers and links are looked up first, then inner triggers, each
//! via the nearest matching ancestor of the target.

use veil_core::dom::{Document, NodeId, Selector};
use veil_core::markup::{INNER_TRIGGER_ATTR, MODAL_LINK_PREFIX, OPEN_TRIGGER_ATTR};

/// A recognized trigger and the modal id it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Open { element: NodeId, id: String },
    Link { element: NodeId, id: String },
    Inner { element: NodeId, id: String },
}

impl Trigger {
    pub fn id(&self) -> &str {
        match self {
            Self::Open { id, .. } | Self::Link { id, .. } | Self::Inner { id, .. } => id,
        }
    }

    pub fn element(&self) -> NodeId {
        match self {
            Self::Open { element, .. } | Self::Link { element, .. } | Self::Inner { element, .. } => {
                *element
            }
        }
    }
}

/// Resolve the trigger enclosing `target`, if any.
///
/// `is_registered` decides whether a fragment link names a known modal.
pub fn resolve(doc: &Document, target: NodeId, is_registered: impl Fn(&str) -> bool) -> Option<Trigger> {
    let open_or_link = Selector::Any(vec![
        Selector::attr(OPEN_TRIGGER_ATTR),
        Selector::All(vec![
            Selector::tag("a"),
            Selector::attr_prefix("href", MODAL_LINK_PREFIX),
        ]),
    ]);
    if let Some(element) = doc.closest(target, &open_or_link) {
        if let Some(id) = doc.attribute(element, OPEN_TRIGGER_ATTR) {
            return Some(Trigger::Open {
                element,
                id: id.to_owned(),
            });
        }
        if let Some(href) = doc.attribute(element, "href") {
            return Some(Trigger::Link {
                element,
                id: href.trim_start_matches('/').to_owned(),
            });
        }
    }

    let fragment_link = Selector::All(vec![Selector::tag("a"), Selector::attr("href")]);
    let mut cursor = doc.closest(target, &fragment_link);
    while let Some(element) = cursor {
        if let Some(id) = doc.attribute(element, "href").and_then(fragment_id)
            && is_registered(id)
        {
            return Some(Trigger::Link {
                element,
                id: id.to_owned(),
            });
        }
        cursor = doc
            .parent(element)
            .and_then(|p| doc.closest(p, &fragment_link));
    }

    let element = doc.closest(target, &Selector::attr(INNER_TRIGGER_ATTR))?;
    let id = doc.attribute(element, INNER_TRIGGER_ATTR)?;
    if id.is_empty() {
        return None;
    }
    Some(Trigger::Inner {
        element,
        id: id.to_owned(),
    })
}

/// `#id` or `/#id` to `id`.
fn fragment_id(href: &str) -> Option<&str> {
    let rest = href.strip_prefix('/').unwrap_or(href);
    let id = rest.strip_prefix('#')?;
    (!id.is_empty()).then_some(id)
}
