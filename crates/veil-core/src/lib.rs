#![forbid(unsafe_code)]

//! Core primitives for Veil: the headless document model, the markup
//! contract shared by overlay widgets, and host input events.

pub mod dom;
pub mod event;
pub mod markup;

pub use dom::{Document, NodeId, Selector, SharedDocument};
pub use event::{Event, EventOutcome, KeyCode, KeyEvent, Modifiers, MouseEvent, MouseEventKind};
