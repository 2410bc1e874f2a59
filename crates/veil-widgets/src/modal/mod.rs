#![forbid(unsafe_code)]

//! Modal surfaces under a shared overlay.
//!
//! # Markup
//!
//! ```html
//! <button data-btn-modal="modal_login">Sign in</button>
//! <a href="/modal_cart">Cart</a>
//!
//! <div data-overlay>
//!   <div data-popup="modal_login" data-overlay-mode="dim">
//!     <button class="close">x</button>
//!     <button data-btn-inner="modal_cart">Go to cart</button>
//!   </div>
//!   <div data-popup="modal_cart">...</div>
//! </div>
//! ```
//!
//! The host forwards input to [`ModalManager::handle_event`], advances the
//! transition clock, and polls the spawner that transitions run on.
//!
//! # Hooks and events
//!
//! Hooks ([`Hook`]) participate in the protocol: they are awaited, and a
//! `BeforeOpen` hook may cancel. Event listeners ([`ModalManager::subscribe`])
//! only observe.

mod config;
mod events;
mod hooks;
mod manager;
pub mod trigger;

pub use config::{CloseFlags, CloseOptions, DEFAULT_FADE, ModalConfig, ModalOptions};
#[cfg(feature = "config-file")]
pub use config::ConfigError;
pub use events::{ModalEvent, ModalEventKind};
pub use hooks::{Hook, HookContext, HookError, HookName, HookOrigin, HookResult, HookVerdict};
pub use manager::{ModalError, ModalHost, ModalManager};
