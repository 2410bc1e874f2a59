#![forbid(unsafe_code)]

//! Attribute and class names forming the markup contract of the overlay widgets.
//!
//! | Name | Meaning |
//! |------|---------|
//! | `data-overlay` | The single shared backdrop element |
//! | `data-popup="<id>"` | A modal surface beneath the overlay |
//! | `data-btn-modal="<id>"` | Open trigger anywhere in the document |
//! | `data-btn-inner="<id>"` | Jump from the open modal straight to another |
//! | `data-overlay-mode="<mode>"` | Overlay mode class requested by one modal |
//! | `.close` | Close control inside the overlay |

/// Marker attribute of the overlay element.
pub const OVERLAY_ATTR: &str = "data-overlay";
/// Attribute carrying a modal's id.
pub const POPUP_ATTR: &str = "data-popup";
/// Attribute on open triggers naming the target modal.
pub const OPEN_TRIGGER_ATTR: &str = "data-btn-modal";
/// Attribute on in-modal navigation triggers naming the next modal.
pub const INNER_TRIGGER_ATTR: &str = "data-btn-inner";
/// Per-modal overlay mode override.
pub const OVERLAY_MODE_ATTR: &str = "data-overlay-mode";

/// Class marking close controls inside the overlay.
pub const CLOSE_CLASS: &str = "close";
/// Class marking the active state of the overlay and modals.
pub const ACTIVE_CLASS: &str = "active";

pub const ARIA_HIDDEN: &str = "aria-hidden";
pub const ARIA_EXPANDED: &str = "aria-expanded";

/// Body class set while scrolling is locked.
pub const SCROLL_LOCK_CLASS: &str = "dis-scroll";
/// Fixed-position elements that get the scrollbar compensation padding.
pub const FIXED_BLOCK_CLASS: &str = "fixed-block";
/// Body attribute remembering the scroll offset while locked.
pub const SCROLL_POSITION_ATTR: &str = "data-position";

/// `href` prefix of anchors that open a modal by path (`/modal_feedback`).
pub const MODAL_LINK_PREFIX: &str = "/modal_";
