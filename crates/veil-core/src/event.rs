#![forbid(unsafe_code)]

//! Input events delivered by the host to overlay widgets.

use bitflags::bitflags;

use crate::dom::NodeId;

/// A host input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Mouse(MouseEvent),
    Key(KeyEvent),
}

impl Event {
    /// Click on `target`.
    #[must_use]
    pub fn click(target: NodeId) -> Self {
        Self::Mouse(MouseEvent {
            kind: MouseEventKind::Click,
            target,
        })
    }

    /// Key press without modifiers.
    #[must_use]
    pub fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent {
            code,
            modifiers: Modifiers::empty(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Click,
}

/// Pointer event targeting the innermost element under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub target: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

bitflags! {
    /// Keyboard modifiers held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// How a widget disposed of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventOutcome {
    /// The widget did not react.
    #[default]
    Ignored,
    /// The widget reacted; `prevent_default` asks the host to suppress the
    /// element's default action (anchor navigation).
    Handled { prevent_default: bool },
}

impl EventOutcome {
    #[inline]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    #[inline]
    pub const fn prevents_default(self) -> bool {
        matches!(
            self,
            Self::Handled {
                prevent_default: true
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_constructor_has_no_modifiers() {
        let Event::Key(key) = Event::key(KeyCode::Escape) else {
            panic!("expected key event");
        };
        assert_eq!(key.code, KeyCode::Escape);
        assert!(key.modifiers.is_empty());
    }

    #[test]
    fn outcome_flags() {
        assert!(!EventOutcome::Ignored.is_handled());
        let handled = EventOutcome::Handled {
            prevent_default: true,
        };
        assert!(handled.is_handled());
        assert!(handled.prevents_default());
        assert!(
            !EventOutcome::Handled {
                prevent_default: false
            }
            .prevents_default()
        );
    }
}
