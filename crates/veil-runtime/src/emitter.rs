#![forbid(unsafe_code)]

//! Callback fan-out with RAII subscriptions.
//!
//! [`Emitter<T>`] broadcasts a value to every live subscriber. Subscribers are
//! held weakly; the strong reference lives in the returned [`Subscription`],
//! so dropping the guard unsubscribes.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 3. `emit` snapshots the subscriber list before calling out, so callbacks
//!    may subscribe, unsubscribe, or emit again without a borrow conflict.
//!    Subscribers added during an emit first hear the next one.
//!
//! # Failure Modes
//!
//! - Callback panic: propagates to the caller of `emit`.
//! - Emitter dropped while subscriptions are alive: the guards stay valid
//!   and simply never fire again.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct Callback<T>(Box<dyn Fn(&T)>);

type Slots<T> = Rc<RefCell<Vec<Weak<Callback<T>>>>>;

/// Single-threaded broadcast of `T` values.
pub struct Emitter<T> {
    slots: Slots<T>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: 'static> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T: 'static> Emitter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It stays registered while the guard lives.
    #[must_use = "dropping the subscription immediately unsubscribes"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong = Rc::new(Callback(Box::new(callback)));
        self.slots.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: strong as Rc<dyn Any>,
        }
    }

    /// Deliver `value` to every live subscriber.
    pub fn emit(&self, value: &T) {
        let live: Vec<Rc<Callback<T>>> = {
            let mut slots = self.slots.borrow_mut();
            slots.retain(|w| w.strong_count() > 0);
            slots.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in live {
            (cb.0)(value);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// RAII guard returned by [`Emitter::subscribe`].
#[must_use = "dropping the subscription immediately unsubscribes"]
pub struct Subscription {
    _guard: Rc<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}
