#![forbid(unsafe_code)]

//! Lifecycle notifications observable by outside code.
//!
//! Listeners see every transition but cannot influence it; vetoes go
//! through hooks.

use std::fmt;

use veil_core::dom::NodeId;

use crate::modal::ModalManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalEventKind {
    BeforeOpen,
    AfterOpen,
    BeforeClose,
    AfterClose,
}

impl ModalEventKind {
    /// DOM custom-event name (`modal:beforeopen`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeforeOpen => "modal:beforeopen",
            Self::AfterOpen => "modal:afteropen",
            Self::BeforeClose => "modal:beforeclose",
            Self::AfterClose => "modal:afterclose",
        }
    }
}

impl fmt::Display for ModalEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload delivered to [`ModalManager::subscribe`] listeners.
#[derive(Clone)]
pub struct ModalEvent {
    pub kind: ModalEventKind,
    pub id: String,
    pub modal: NodeId,
    pub manager: ModalManager,
}

impl fmt::Debug for ModalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalEvent")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("modal", &self.modal)
            .finish_non_exhaustive()
    }
}
