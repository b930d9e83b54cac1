use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rift_core::engine::observable::Observable;
use rift_core::engine::observer::{Observer, Subject};

mod common;
use common::*;

fn counting(count: &Rc<Cell<u32>>) -> Observer<()> {
    let count = Rc::clone(count);
    Observer::new(move |_: &()| count.set(count.get() + 1))
}

#[test]
fn attaching_twice_delivers_once() {
    init_tracing();
    let subject: Subject = Subject::new();
    let hits = Rc::new(Cell::new(0));
    let observer = counting(&hits);

    assert!(subject.attach(&observer, false));
    assert!(!subject.attach(&observer, false));
    assert!(!subject.attach(&observer.clone(), false), "clones share identity");

    subject.notify_all(&());
    assert_eq!(hits.get(), 1);
    assert_eq!(subject.len(), 1);
}

#[test]
fn delivery_follows_attachment_order() {
    let subject: Subject<u32> = Subject::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let observers: Vec<Observer<u32>> = ["a", "b", "c"]
        .into_iter()
        .map(|name| {
            let log = Rc::clone(&log);
            Observer::new(move |value: &u32| log.borrow_mut().push(format!("{name}{value}")))
        })
        .collect();

    assert!(subject.attach(&observers[1], false));
    assert!(subject.attach(&observers[0], false));
    assert!(subject.attach(&observers[2], false));

    subject.notify_all(&7);
    assert_eq!(*log.borrow(), vec!["b7", "a7", "c7"]);
}

#[test]
fn multi_argument_subjects_pass_tuples() {
    let subject: Subject<(u32, f32, &'static str)> = Subject::new();
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let observer = Observer::new(move |&(id, amount, source): &(u32, f32, &'static str)| {
        *sink.borrow_mut() = Some((id, amount, source));
    });

    subject.attach(&observer, false);
    subject.notify_all(&(3, 12.5, "laser"));

    assert_eq!(*seen.borrow(), Some((3, 12.5, "laser")));
}

#[test]
fn detach_of_unknown_observer_is_rejected() {
    let subject: Subject = Subject::new();
    let hits = Rc::new(Cell::new(0));
    let attached = counting(&hits);
    let stranger = counting(&hits);

    subject.attach(&attached, false);
    assert!(!subject.detach(&stranger));
    assert!(subject.detach(&attached));
    assert!(!subject.detach(&attached));

    subject.notify_all(&());
    assert_eq!(hits.get(), 0);
}

#[test]
fn detach_disposes_only_flagged_observers() {
    let subject: Subject = Subject::new();
    let hits = Rc::new(Cell::new(0));
    let owned = counting(&hits);
    let borrowed = counting(&hits);

    subject.attach(&owned, true);
    subject.attach(&borrowed, false);

    subject.detach(&owned);
    subject.detach(&borrowed);

    assert!(owned.is_disposed());
    assert!(!borrowed.is_disposed());
}

#[test]
fn detach_all_keeps_subject_usable() {
    let subject: Subject = Subject::new();
    let hits = Rc::new(Cell::new(0));
    let flagged = counting(&hits);
    let plain = counting(&hits);

    subject.attach(&flagged, true);
    subject.attach(&plain, false);
    subject.detach_all();

    assert!(subject.is_empty());
    assert!(flagged.is_disposed());
    assert!(!plain.is_disposed());

    assert!(subject.attach(&plain, false));
    subject.notify_all(&());
    assert_eq!(hits.get(), 1);
}

#[test]
fn observer_may_detach_itself_during_notification() {
    let subject: Subject = Subject::new();
    let hits = Rc::new(Cell::new(0));

    let slot: Rc<RefCell<Option<Observer<()>>>> = Rc::new(RefCell::new(None));
    let self_removing = {
        let subject = subject.clone();
        let slot = Rc::clone(&slot);
        let hits = Rc::clone(&hits);
        Observer::new(move |_: &()| {
            hits.set(hits.get() + 1);
            if let Some(me) = slot.borrow().as_ref() {
                subject.detach(me);
            }
        })
    };
    *slot.borrow_mut() = Some(self_removing.clone());

    let tail = counting(&hits);
    subject.attach(&self_removing, false);
    subject.attach(&tail, false);

    subject.notify_all(&());
    assert_eq!(hits.get(), 2, "both run in the pass that detaches");
    assert_eq!(subject.len(), 1);

    subject.notify_all(&());
    assert_eq!(hits.get(), 3, "only the tail runs afterwards");
}

#[test]
fn observer_detached_by_earlier_callback_is_skipped() {
    let subject: Subject = Subject::new();
    let hits = Rc::new(Cell::new(0));
    let victim = counting(&hits);

    let remover = {
        let subject = subject.clone();
        let victim = victim.clone();
        Observer::new(move |_: &()| {
            subject.detach(&victim);
        })
    };

    subject.attach(&remover, false);
    subject.attach(&victim, false);
    subject.notify_all(&());

    assert_eq!(hits.get(), 0);
    assert!(!subject.contains(&victim));
}

#[test]
fn observer_reattached_mid_pass_moves_to_the_end() {
    let subject: Subject = Subject::new();
    let log = call_log();
    let labelled = |label: &'static str| {
        let log = Rc::clone(&log);
        Observer::new(move |_: &()| log.borrow_mut().push(label.to_string()))
    };
    let second = labelled("b");
    let third = labelled("c");

    let done = Rc::new(Cell::new(false));
    let first = {
        let subject = subject.clone();
        let second = second.clone();
        let done = Rc::clone(&done);
        let log = Rc::clone(&log);
        Observer::new(move |_: &()| {
            log.borrow_mut().push("a".to_string());
            if !done.replace(true) {
                subject.detach(&second);
                subject.attach(&second, false);
            }
        })
    };

    subject.attach(&first, false);
    subject.attach(&second, false);
    subject.attach(&third, false);

    subject.notify_all(&());
    assert_eq!(entries(&log), vec!["a", "c"]);

    log.borrow_mut().clear();
    subject.notify_all(&());
    assert_eq!(entries(&log), vec!["a", "c", "b"]);
}

#[test]
fn reentrant_notification_skips_the_running_observer() {
    init_tracing();
    let subject: Subject<u32> = Subject::new();
    let depth = Rc::new(Cell::new(0));

    let recursive = {
        let subject = subject.clone();
        let depth = Rc::clone(&depth);
        Observer::new(move |level: &u32| {
            depth.set(depth.get() + 1);
            if *level == 0 {
                subject.notify_all(&1);
            }
        })
    };

    subject.attach(&recursive, false);
    subject.notify_all(&0);
    assert_eq!(depth.get(), 1);
}

#[test]
fn disposed_subject_ignores_everything() {
    let subject: Subject = Subject::new();
    let hits = Rc::new(Cell::new(0));
    let flagged = counting(&hits);
    let plain = counting(&hits);

    subject.attach(&flagged, true);
    subject.attach(&plain, false);

    assert!(subject.dispose());
    assert!(!subject.dispose());
    assert!(subject.is_disposed());
    assert!(flagged.is_disposed());
    assert!(!plain.is_disposed());

    subject.notify_all(&());
    assert!(!subject.attach(&plain, false));
    assert_eq!(hits.get(), 0);
}

#[test]
fn observer_dispose_hook_runs_once_across_subjects() {
    let first: Subject = Subject::new();
    let second: Subject = Subject::new();
    let disposals = counter();
    let hook = Rc::clone(&disposals);
    let shared = Observer::with_dispose(|_: &()| {}, move || hook.set(hook.get() + 1));

    first.attach(&shared, true);
    second.attach(&shared, true);

    first.dispose();
    second.dispose();
    assert!(!shared.dispose());
    assert_eq!(disposals.get(), 1);
}

#[test]
fn disposed_observer_is_not_invoked_or_attached() {
    let subject: Subject = Subject::new();
    let hits = Rc::new(Cell::new(0));
    let observer = counting(&hits);

    subject.attach(&observer, false);
    observer.dispose();
    subject.notify_all(&());
    assert_eq!(hits.get(), 0);

    let fresh: Subject = Subject::new();
    assert!(!fresh.attach(&observer, false));
}

#[test]
fn bound_observer_stops_after_target_drops() {
    let subject: Subject<f32> = Subject::new();
    let target = Rc::new(RefCell::new(0.0_f32));
    let observer = Observer::bind(&target, |total: &mut f32, dt: &f32| *total += *dt);
    subject.attach(&observer, false);

    subject.notify_all(&0.5);
    subject.notify_all(&0.25);
    assert_eq!(*target.borrow(), 0.75);

    drop(target);
    subject.notify_all(&1.0);
}

#[test]
fn observable_notifies_only_on_change() {
    let mut health = Observable::new(100_i32);
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let observer = Observer::new(move |&(old, new): &(i32, i32)| sink.borrow_mut().push((old, new)));
    assert!(health.subscribe(&observer));

    assert!(health.set(80));
    assert!(!health.set(80));
    health.set_silently(50);
    assert!(health.set(0));

    assert_eq!(*changes.borrow(), vec![(100, 80), (50, 0)]);
    assert_eq!(*health.get(), 0);

    assert!(health.dispose());
    health.set(10);
    assert_eq!(changes.borrow().len(), 2);
}
