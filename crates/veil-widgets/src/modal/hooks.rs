#![forbid(unsafe_code)]

//! Lifecycle hooks.
//!
//! Each of the four lifecycle points has two slots: a global hook fixed at
//! construction and a per-call hook installed with `on`/`once` and removed
//! with `off`.
//!
//! # Ordering
//!
//! | Phase | Order |
//! |-------|-------|
//! | `BeforeOpen`, `AfterOpen` | global, then per-call |
//! | `BeforeClose`, `AfterClose` | per-call, then global |
//!
//! # Verdicts
//!
//! Only `BeforeOpen` may veto, by returning [`HookVerdict::Cancel`]. A veto
//! from any other phase is ignored. A hook returning `Err` is logged and
//! counts as [`HookVerdict::Proceed`].

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use veil_core::dom::NodeId;

use crate::modal::ModalManager;

/// Named lifecycle point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
    BeforeOpen,
    AfterOpen,
    BeforeClose,
    AfterClose,
}

impl HookName {
    pub const COUNT: usize = 4;
    pub const ALL: [HookName; Self::COUNT] = [
        Self::BeforeOpen,
        Self::AfterOpen,
        Self::BeforeClose,
        Self::AfterClose,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeforeOpen => "beforeOpen",
            Self::AfterOpen => "afterOpen",
            Self::BeforeClose => "beforeClose",
            Self::AfterClose => "afterClose",
        }
    }

    /// Whether a `Cancel` verdict aborts the transition.
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::BeforeOpen)
    }

    /// Whether the global hook runs before the per-call one.
    pub const fn global_first(self) -> bool {
        matches!(self, Self::BeforeOpen | Self::AfterOpen)
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookVerdict {
    #[default]
    Proceed,
    Cancel,
}

/// Failure reported by a hook. Logged, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HookError {}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

pub type HookResult = Result<HookVerdict, HookError>;

/// What a hook is told about the transition.
#[derive(Clone)]
pub struct HookContext {
    pub id: String,
    pub modal: NodeId,
    pub manager: ModalManager,
}

impl fmt::Debug for HookContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("id", &self.id)
            .field("modal", &self.modal)
            .finish_non_exhaustive()
    }
}

type HookFn = dyn Fn(HookContext) -> LocalBoxFuture<'static, HookResult>;

/// A lifecycle callback, synchronous or asynchronous.
#[derive(Clone)]
pub struct Hook(Rc<HookFn>);

impl Hook {
    /// Wrap a synchronous callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&HookContext) -> HookResult + 'static,
    {
        Self(Rc::new(move |ctx: HookContext| {
            let result = f(&ctx);
            futures::future::ready(result).boxed_local()
        }))
    }

    /// Wrap an asynchronous callback; the manager awaits it.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        Self(Rc::new(move |ctx: HookContext| f(ctx).boxed_local()))
    }

    pub(crate) fn call(&self, ctx: HookContext) -> LocalBoxFuture<'static, HookResult> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook")
    }
}

/// Which slot a hook came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOrigin {
    Global,
    PerCall,
}

impl fmt::Display for HookOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Global => "global",
            Self::PerCall => "per-call",
        })
    }
}

#[derive(Debug, Clone)]
struct PerCall {
    hook: Hook,
    once: bool,
}

/// Global and per-call hook slots.
#[derive(Debug, Default)]
pub(crate) struct HookRegistry {
    global: [Option<Hook>; HookName::COUNT],
    per_call: [Option<PerCall>; HookName::COUNT],
}

impl HookRegistry {
    pub(crate) fn new(global: [Option<Hook>; HookName::COUNT]) -> Self {
        Self {
            global,
            per_call: Default::default(),
        }
    }

    /// Install the per-call hook for `name`, replacing any previous one.
    pub(crate) fn on(&mut self, name: HookName, hook: Hook) {
        self.per_call[name.index()] = Some(PerCall { hook, once: false });
    }

    /// Install a per-call hook removed after it first fires.
    pub(crate) fn once(&mut self, name: HookName, hook: Hook) {
        self.per_call[name.index()] = Some(PerCall { hook, once: true });
    }

    pub(crate) fn off(&mut self, name: HookName) {
        self.per_call[name.index()] = None;
    }

    #[cfg(test)]
    pub(crate) fn has_per_call(&self, name: HookName) -> bool {
        self.per_call[name.index()].is_some()
    }

    /// Hooks to run for `name`, in invocation order. A `once` hook is
    /// removed from its slot here.
    pub(crate) fn take_sequence(&mut self, name: HookName) -> Vec<(HookOrigin, Hook)> {
        let idx = name.index();
        let global = self.global[idx]
            .clone()
            .map(|hook| (HookOrigin::Global, hook));
        let per_call = match self.per_call[idx].as_ref().map(|slot| slot.once) {
            Some(true) => self.per_call[idx]
                .take()
                .map(|slot| (HookOrigin::PerCall, slot.hook)),
            Some(false) => self.per_call[idx]
                .as_ref()
                .map(|slot| (HookOrigin::PerCall, slot.hook.clone())),
            None => None,
        };

        let (first, second) = if name.global_first() {
            (global, per_call)
        } else {
            (per_call, global)
        };
        first.into_iter().chain(second).collect()
    }
}
