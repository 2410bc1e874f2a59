#![forbid(unsafe_code)]

//! Host-driven transitions.
//!
//! The [`TransitionClock`] is a deterministic timer queue advanced by the
//! host (an animation-frame callback in a browser, an explicit `advance` in
//! tests). [`Animator`]s use it to stage inline-style changes and to complete
//! the [`AnimationHandle`] returned to whoever awaits the transition.
//!
//! # Invariants
//!
//! 1. Due tasks run in `(deadline, insertion)` order.
//! 2. A task scheduled while the clock is firing runs in the same
//!    `advance` call when its deadline has already passed.
//! 3. An [`AnimationHandle`] always resolves once its completer is either
//!    completed or dropped; a collaborator giving up never stalls the awaiter.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use veil_runtime::transition::TransitionClock;
//!
//! let clock = TransitionClock::new();
//! let (handle, completer) = veil_runtime::transition::AnimationHandle::pending();
//! clock.schedule(Duration::from_millis(300), move || completer.complete());
//!
//! clock.advance(Duration::from_millis(299));
//! assert!(!handle.is_settled());
//! clock.advance(Duration::from_millis(1));
//! assert!(handle.is_settled());
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::channel::oneshot;
use veil_core::dom::{NodeId, SharedDocument};
use web_time::Instant;

/// Delay before fade-in raises opacity, giving the host a frame to apply
/// `opacity: 0` first.
pub const FADE_IN_KICKOFF: Duration = Duration::from_millis(10);

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Task {
    id: TimerId,
    deadline: Duration,
    run: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ClockState {
    elapsed: Duration,
    next_id: u64,
    tasks: Vec<Task>,
    last_tick: Option<Instant>,
}

/// Deterministic timer queue advanced by the host.
#[derive(Clone, Default)]
pub struct TransitionClock {
    state: Rc<RefCell<ClockState>>,
}

impl fmt::Debug for TransitionClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TransitionClock")
            .field("elapsed", &state.elapsed)
            .field("pending", &state.tasks.len())
            .finish()
    }
}

impl TransitionClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `run` once `after` has elapsed from now.
    pub fn schedule(&self, after: Duration, run: impl FnOnce() + 'static) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let deadline = state.elapsed + after;
        state.tasks.push(Task {
            id,
            deadline,
            run: Box::new(run),
        });
        id
    }

    /// Drop a scheduled task. Returns whether it was still pending.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        state.tasks.len() != before
    }

    /// Move the clock forward by `dt`, running every task that becomes due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, dt: Duration) -> usize {
        let now = {
            let mut state = self.state.borrow_mut();
            state.elapsed += dt;
            state.elapsed
        };
        let mut ran = 0;
        while let Some(task) = self.take_due(now) {
            (task.run)();
            ran += 1;
        }
        ran
    }

    /// Advance to a wall-clock instant supplied by the host.
    ///
    /// The first call only records the reference point.
    pub fn tick_at(&self, now: Instant) -> usize {
        let dt = {
            let mut state = self.state.borrow_mut();
            let dt = state
                .last_tick
                .map(|last| now.saturating_duration_since(last))
                .unwrap_or_default();
            state.last_tick = Some(now);
            dt
        };
        self.advance(dt)
    }

    /// Time advanced so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.state.borrow().elapsed
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    fn take_due(&self, now: Duration) -> Option<Task> {
        let mut state = self.state.borrow_mut();
        // Insertion order breaks deadline ties because ids grow monotonically.
        let idx = state
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.id.0))
            .map(|(i, _)| i)?;
        Some(state.tasks.remove(idx))
    }
}

/// Awaitable completion signal of one animation.
#[must_use = "an animation handle does nothing unless awaited"]
pub struct AnimationHandle {
    rx: Option<oneshot::Receiver<()>>,
    settled: Rc<Cell<bool>>,
}

/// Producer side of an [`AnimationHandle`].
///
/// Dropping it without calling [`complete`](Self::complete) still settles
/// the handle.
pub struct AnimationCompleter {
    tx: Option<oneshot::Sender<()>>,
    settled: Rc<Cell<bool>>,
}

impl AnimationHandle {
    /// A handle plus the completer that settles it.
    pub fn pending() -> (Self, AnimationCompleter) {
        let (tx, rx) = oneshot::channel();
        let settled = Rc::new(Cell::new(false));
        (
            Self {
                rx: Some(rx),
                settled: Rc::clone(&settled),
            },
            AnimationCompleter {
                tx: Some(tx),
                settled,
            },
        )
    }

    /// A handle that is already settled.
    pub fn ready() -> Self {
        Self {
            rx: None,
            settled: Rc::new(Cell::new(true)),
        }
    }

    /// Whether awaiting the handle would complete immediately.
    pub fn is_settled(&self) -> bool {
        self.settled.get()
    }
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl Future for AnimationHandle {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(());
        };
        match Pin::new(rx).poll(cx) {
            // Canceled (completer dropped) counts as completion.
            Poll::Ready(_) => {
                self.rx = None;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl AnimationCompleter {
    pub fn complete(mut self) {
        self.settle();
    }

    fn settle(&mut self) {
        self.settled.set(true);
        if let Some(tx) = self.tx.take() {
            // The awaiter may already be gone.
            let _ = tx.send(());
        }
    }
}

impl Drop for AnimationCompleter {
    fn drop(&mut self) {
        self.settle();
    }
}

impl fmt::Debug for AnimationCompleter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnimationCompleter")
    }
}

/// Opacity transitions applied to modal surfaces.
pub trait Animator {
    /// Reveal `node` with a fade lasting `duration`, using `display` as its
    /// display value.
    fn fade_in(&self, node: NodeId, duration: Duration, display: &str) -> AnimationHandle;

    /// Hide `node` with a fade lasting `duration`, ending with `display: none`.
    fn fade_out(&self, node: NodeId, duration: Duration) -> AnimationHandle;
}

/// Inline-style fades driven by a [`TransitionClock`].
#[derive(Debug, Clone)]
pub struct FadeAnimator {
    document: SharedDocument,
    clock: TransitionClock,
}

impl FadeAnimator {
    pub fn new(document: SharedDocument, clock: TransitionClock) -> Self {
        Self { document, clock }
    }

    pub fn clock(&self) -> &TransitionClock {
        &self.clock
    }
}

impl Animator for FadeAnimator {
    fn fade_in(&self, node: NodeId, duration: Duration, display: &str) -> AnimationHandle {
        {
            let mut doc = self.document.borrow_mut();
            doc.set_style(node, "opacity", "0");
            doc.set_style(node, "display", display);
            doc.set_style(node, "transition", format!("all {}ms", duration.as_millis()));
        }

        let document = Rc::clone(&self.document);
        self.clock.schedule(FADE_IN_KICKOFF, move || {
            document.borrow_mut().set_style(node, "opacity", "1");
        });

        let (handle, completer) = AnimationHandle::pending();
        self.clock.schedule(duration, move || completer.complete());
        handle
    }

    fn fade_out(&self, node: NodeId, duration: Duration) -> AnimationHandle {
        {
            let mut doc = self.document.borrow_mut();
            doc.set_style(node, "opacity", "1");
            doc.set_style(
                node,
                "transition",
                format!("all {}ms ease", duration.as_millis()),
            );
            doc.set_style(node, "opacity", "0");
        }

        let (handle, completer) = AnimationHandle::pending();
        let document = Rc::clone(&self.document);
        self.clock.schedule(duration, move || {
            document.borrow_mut().set_style(node, "display", "none");
            completer.complete();
        });
        handle
    }
}
