//! Open/close protocol: mutual exclusion, overlay consistency, locking,
//! hooks, URL sync, scroll lock.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use common::Harness;
use futures::FutureExt;
use futures::channel::oneshot;
use veil_core::markup::{ARIA_EXPANDED, ARIA_HIDDEN, SCROLL_LOCK_CLASS};
use veil_runtime::ScrollLock;
use veil_widgets::modal::{
    CloseOptions, Hook, HookError, HookName, HookVerdict, ModalConfig, ModalEventKind,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn open_swap_close_scenario() {
    let mut h = Harness::new(ModalConfig::new());

    assert!(h.open("modal_a"));
    assert_eq!(h.active_modals(), [h.page.modal_a]);
    assert!(h.overlay_active());
    assert_eq!(h.history.url(), "/#modal_a");
    assert_eq!(h.manager.current_modal().as_deref(), Some("modal_a"));

    // Step through the swap and watch the overlay at every tick.
    let result = h.open_deferred("modal_b");
    let mut ticks = 0;
    while result.get().is_none() {
        h.step(ms(10));
        assert!(h.overlay_active(), "overlay dropped during swap");
        ticks += 1;
        assert!(ticks < 200, "swap never settled");
    }
    assert_eq!(result.get(), Some(true));
    assert!(!h.is_active(h.page.modal_a));
    assert!(h.is_active(h.page.modal_b));
    assert_eq!(h.history.url(), "/#modal_b");
    assert_eq!(h.style(h.page.modal_a, "display").as_deref(), Some("none"));

    h.close(CloseOptions::all());
    assert!(h.active_modals().is_empty());
    assert!(!h.overlay_active());
    assert_eq!(h.history.url(), "/");
    assert!(!h.scroll.is_locked());
    assert_eq!(h.manager.current_modal(), None);
}

#[test]
fn cancelled_open_leaves_everything_untouched() {
    let config = ModalConfig::new().before_open(Hook::new(|_| Ok(HookVerdict::Cancel)));
    let mut h = Harness::new(config);

    assert!(!h.open("modal_a"));
    assert!(!h.is_active(h.page.modal_a));
    assert!(!h.overlay_active());
    assert_eq!(h.history.url(), "/");
    assert_eq!(h.history.len(), 1);
    assert!(!h.manager.is_animating());
}

#[test]
fn cancel_from_global_hook_skips_per_call_hook() {
    let config = ModalConfig::new().before_open(Hook::new(|_| Ok(HookVerdict::Cancel)));
    let mut h = Harness::new(config);
    let calls = Rc::new(Cell::new(0));
    let c = Rc::clone(&calls);
    h.manager.on(
        HookName::BeforeOpen,
        Hook::new(move |_| {
            c.set(c.get() + 1);
            Ok(HookVerdict::Proceed)
        }),
    );

    assert!(!h.open("modal_a"));
    assert_eq!(calls.get(), 0);
}

#[test]
fn open_during_transition_is_rejected_without_mutation() {
    let mut h = Harness::new(ModalConfig::new());
    let first = h.open_deferred("modal_a");
    h.step(ms(100));
    assert!(h.manager.is_animating());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let _sub = h.manager.subscribe(move |ev| s.borrow_mut().push(ev.kind));

    let second = h.open_deferred("modal_b");
    h.pool.run_until_stalled();
    assert_eq!(second.get(), Some(false));
    assert!(!h.is_active(h.page.modal_b));
    assert_eq!(h.style(h.page.modal_b, "opacity"), None);
    assert!(seen.borrow().is_empty());

    h.settle();
    assert_eq!(first.get(), Some(true));
    assert_eq!(h.active_modals(), [h.page.modal_a]);
}

#[test]
fn plain_close_during_transition_is_ignored() {
    let mut h = Harness::new(ModalConfig::new());
    let opened = h.open_deferred("modal_a");
    h.step(ms(50));
    h.close(CloseOptions::all());

    assert_eq!(opened.get(), Some(true));
    assert!(h.is_active(h.page.modal_a));
    assert!(h.overlay_active());
}

#[test]
fn lock_is_released_when_the_future_is_dropped() {
    let h = Harness::new(ModalConfig::new());
    let mut open = Box::pin(h.manager.open_modal("modal_a"));
    assert!((&mut open).now_or_never().is_none());
    assert!(h.manager.is_animating());
    drop(open);
    assert!(!h.manager.is_animating());
}

#[test]
fn unknown_modal_fails_fast() {
    let mut h = Harness::new(ModalConfig::new());
    assert!(!h.open("modal_missing"));
    assert!(!h.manager.is_animating());
    assert!(!h.overlay_active());
}

#[test]
fn close_hooks_run_per_call_before_global() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let (g_open, g_close) = (Rc::clone(&order), Rc::clone(&order));
    let config = ModalConfig::new()
        .before_open(Hook::new(move |_| {
            g_open.borrow_mut().push("global beforeOpen");
            Ok(HookVerdict::Proceed)
        }))
        .after_close(Hook::new(move |_| {
            g_close.borrow_mut().push("global afterClose");
            Ok(HookVerdict::Proceed)
        }));
    let mut h = Harness::new(config);

    let (p_open, p_close) = (Rc::clone(&order), Rc::clone(&order));
    h.manager
        .on(
            HookName::BeforeOpen,
            Hook::new(move |_| {
                p_open.borrow_mut().push("per-call beforeOpen");
                Ok(HookVerdict::Proceed)
            }),
        )
        .on(
            HookName::AfterClose,
            Hook::new(move |_| {
                p_close.borrow_mut().push("per-call afterClose");
                Ok(HookVerdict::Proceed)
            }),
        );

    assert!(h.open("modal_a"));
    h.close(CloseOptions::all());
    assert_eq!(
        *order.borrow(),
        [
            "global beforeOpen",
            "per-call beforeOpen",
            "per-call afterClose",
            "global afterClose",
        ]
    );
}

#[test]
fn hook_context_names_the_modal() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let config = ModalConfig::new().after_open(Hook::new(move |ctx| {
        assert!(ctx.manager.is_animating());
        s.borrow_mut().push((ctx.id.clone(), ctx.modal));
        Ok(HookVerdict::Proceed)
    }));
    let mut h = Harness::new(config);

    assert!(h.open("modal_b"));
    assert_eq!(*seen.borrow(), [("modal_b".to_owned(), h.page.modal_b)]);
}

#[test]
fn failing_hooks_are_logged_and_do_not_abort() {
    let config = ModalConfig::new()
        .before_open(Hook::new(|_| Err(HookError::new("boom"))))
        .before_close(Hook::new(|_| Err("bang".into())));
    let mut h = Harness::new(config);

    assert!(h.open("modal_a"));
    h.close(CloseOptions::all());
    assert!(!h.is_active(h.page.modal_a));
    assert!(!h.overlay_active());
    assert!(!h.manager.is_animating());
}

#[test]
fn cancel_from_after_open_is_ignored() {
    let config = ModalConfig::new().after_open(Hook::new(|_| Ok(HookVerdict::Cancel)));
    let mut h = Harness::new(config);
    assert!(h.open("modal_a"));
    assert!(h.manager.is_open("modal_a"));
}

#[test]
fn once_hook_fires_a_single_time() {
    let mut h = Harness::new(ModalConfig::new());
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    h.manager.once(
        HookName::AfterOpen,
        Hook::new(move |_| {
            c.set(c.get() + 1);
            Ok(HookVerdict::Proceed)
        }),
    );

    assert!(h.open("modal_a"));
    h.close(CloseOptions::all());
    assert!(h.open("modal_a"));
    assert_eq!(count.get(), 1);
}

#[test]
fn off_removes_per_call_hook_only() {
    let global = Rc::new(Cell::new(0));
    let per_call = Rc::new(Cell::new(0));
    let g = Rc::clone(&global);
    let config = ModalConfig::new().after_open(Hook::new(move |_| {
        g.set(g.get() + 1);
        Ok(HookVerdict::Proceed)
    }));
    let mut h = Harness::new(config);
    let p = Rc::clone(&per_call);
    h.manager
        .on(
            HookName::AfterOpen,
            Hook::new(move |_| {
                p.set(p.get() + 1);
                Ok(HookVerdict::Proceed)
            }),
        )
        .off(HookName::AfterOpen);

    assert!(h.open("modal_a"));
    assert_eq!(global.get(), 1);
    assert_eq!(per_call.get(), 0);
}

#[test]
fn async_before_close_hook_is_awaited() {
    let (tx, rx) = oneshot::channel::<()>();
    let rx = Rc::new(RefCell::new(Some(rx)));
    let config = ModalConfig::new().before_close(Hook::from_async(move |_| {
        let rx = rx.borrow_mut().take();
        async move {
            if let Some(rx) = rx {
                let _ = rx.await;
            }
            Ok(HookVerdict::Proceed)
        }
    }));
    let mut h = Harness::new(config);
    assert!(h.open("modal_a"));

    let manager = h.manager.clone();
    h.spawn(async move {
        manager.close_all_modals(CloseOptions::all()).await;
    });
    h.settle();
    assert!(h.is_active(h.page.modal_a), "close ran past a pending hook");
    assert!(h.manager.is_animating());

    tx.send(()).unwrap();
    h.settle();
    assert!(!h.is_active(h.page.modal_a));
    assert!(!h.manager.is_animating());
}

#[test]
fn lifecycle_events_in_order() {
    let mut h = Harness::new(ModalConfig::new());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let _sub = h
        .manager
        .subscribe(move |ev| s.borrow_mut().push((ev.kind, ev.id.clone())));

    assert!(h.open("modal_a"));
    assert!(h.open("modal_b"));
    h.close(CloseOptions::all());

    use ModalEventKind::*;
    let expected: Vec<(ModalEventKind, String)> = [
        (BeforeOpen, "modal_a"),
        (AfterOpen, "modal_a"),
        (BeforeOpen, "modal_b"),
        (BeforeClose, "modal_a"),
        (AfterClose, "modal_a"),
        (AfterOpen, "modal_b"),
        (BeforeClose, "modal_b"),
        (AfterClose, "modal_b"),
    ]
    .into_iter()
    .map(|(k, id)| (k, id.to_owned()))
    .collect();
    assert_eq!(*seen.borrow(), expected);
}

#[test]
fn dropping_subscription_stops_events() {
    let mut h = Harness::new(ModalConfig::new());
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    let sub = h.manager.subscribe(move |_| c.set(c.get() + 1));
    drop(sub);
    assert!(h.open("modal_a"));
    assert_eq!(count.get(), 0);
}

#[test]
fn scroll_lock_follows_open_state() {
    let mut h = Harness::new(ModalConfig::new());
    h.scroll.viewport().scroll_to(640);

    assert!(h.open("modal_a"));
    {
        let doc = h.doc.borrow();
        assert!(doc.has_class(doc.body(), SCROLL_LOCK_CLASS));
        assert_eq!(doc.style(doc.body(), "top"), Some("-640px"));
        assert_eq!(doc.style(h.page.header, "padding-right"), Some("15px"));
    }

    // A swap keeps the page locked.
    assert!(h.open("modal_b"));
    assert!(h.scroll.is_locked());

    h.close(CloseOptions::all());
    assert!(!h.scroll.is_locked());
    assert_eq!(h.scroll.viewport().scroll_y(), 640);
}

#[test]
fn aria_tracks_the_open_modal() {
    let mut h = Harness::new(ModalConfig::new());
    assert_eq!(h.attr(h.page.overlay, ARIA_HIDDEN).as_deref(), Some("true"));
    assert_eq!(h.attr(h.page.open_a, ARIA_EXPANDED).as_deref(), Some("false"));

    assert!(h.open("modal_b"));
    assert_eq!(h.attr(h.page.modal_b, ARIA_HIDDEN).as_deref(), Some("false"));
    assert_eq!(h.attr(h.page.modal_a, ARIA_HIDDEN).as_deref(), Some("true"));
    assert_eq!(h.attr(h.page.overlay, ARIA_HIDDEN).as_deref(), Some("false"));
    assert_eq!(h.attr(h.page.open_a, ARIA_EXPANDED).as_deref(), Some("true"));
    assert_eq!(h.attr(h.page.open_b, ARIA_EXPANDED).as_deref(), Some("true"));

    h.close(CloseOptions::all());
    for node in [h.page.modal_a, h.page.modal_b, h.page.overlay] {
        assert_eq!(h.attr(node, ARIA_HIDDEN).as_deref(), Some("true"));
    }
    assert_eq!(h.attr(h.page.open_b, ARIA_EXPANDED).as_deref(), Some("false"));
}

#[test]
fn fade_styles_are_applied() {
    let mut h = Harness::new(ModalConfig::new().fade_in(ms(200)).fade_out(ms(120)));
    let opened = h.open_deferred("modal_a");
    h.pool.run_until_stalled();
    assert_eq!(h.style(h.page.modal_a, "display").as_deref(), Some("flex"));
    assert_eq!(h.style(h.page.modal_a, "transition").as_deref(), Some("all 200ms"));
    h.step(ms(10));
    assert_eq!(h.style(h.page.modal_a, "opacity").as_deref(), Some("1"));
    h.step(ms(189));
    assert_eq!(opened.get(), None);
    h.step(ms(1));
    assert_eq!(opened.get(), Some(true));

    h.close(CloseOptions::all());
    assert_eq!(h.style(h.page.modal_a, "display").as_deref(), Some("none"));
    assert_eq!(h.style(h.page.modal_a, "opacity").as_deref(), Some("0"));
}

#[test]
fn reopening_the_same_modal_pushes_no_duplicate_entry() {
    let mut h = Harness::new(ModalConfig::new());
    assert!(h.open("modal_a"));
    assert_eq!(h.history.len(), 2);

    // Already open: the swap closes nothing, the fragment already matches.
    assert!(h.open("modal_a"));
    assert_eq!(h.history.len(), 2);
    assert_eq!(h.active_modals(), [h.page.modal_a]);
}

#[test]
fn overlay_mode_last_mode_wins() {
    let mut h = Harness::with_page("/", ModalConfig::new().active_mode(" dim "), |doc, page| {
        doc.set_attribute(page.modal_b, veil_core::markup::OVERLAY_MODE_ATTR, "bright");
    });
    let has = |h: &Harness, class: &str| h.doc.borrow().has_class(h.page.overlay, class);

    assert!(h.open("modal_a"));
    assert!(has(&h, "dim"));

    assert!(h.open("modal_b"));
    assert!(has(&h, "bright"));
    assert!(!has(&h, "dim"));

    assert!(h.open("modal_a"));
    assert!(has(&h, "dim"));
    assert!(!has(&h, "bright"));

    h.close(CloseOptions::all());
    assert!(!has(&h, "dim"));
    assert!(!has(&h, "bright"));
}

#[test]
fn zero_durations_fall_back_to_default() {
    let h = Harness::new(ModalConfig::new().fade_in(Duration::ZERO));
    assert_eq!(h.manager.options().fade_in, ms(300));
}
