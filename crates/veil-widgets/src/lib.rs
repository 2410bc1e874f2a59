#![forbid(unsafe_code)]

//! Overlay widgets for Veil.
//!
//! - [`modal`]: the modal lifecycle manager.

pub mod modal;

pub use modal::{
    CloseFlags, CloseOptions, Hook, HookContext, HookError, HookName, HookVerdict, ModalConfig,
    ModalError, ModalEvent, ModalEventKind, ModalHost, ModalManager, ModalOptions,
};
