#![forbid(unsafe_code)]

//! Host-driven collaborators for Veil overlay widgets.
//!
//! - [`emitter`]: callback fan-out with RAII [`Subscription`]s.
//! - [`transition`]: deterministic [`TransitionClock`] and the fade
//!   [`Animator`].
//! - [`scroll_lock`]: page scroll locking while an overlay is shown.
//! - [`navigation`]: URL fragment and session history.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); the host drives
//! time and delivers traversal events.

pub mod emitter;
pub mod navigation;
pub mod scroll_lock;
pub mod transition;

pub use emitter::{Emitter, Subscription};
pub use navigation::{HistoryState, MemoryHistory, Navigation, PopState};
pub use scroll_lock::{BodyScrollLock, ScrollLock, Viewport};
pub use transition::{
    AnimationCompleter, AnimationHandle, Animator, FadeAnimator, TimerId, TransitionClock,
};
