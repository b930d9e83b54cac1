//! # Observer Bus
//!
//! A minimal, single-threaded publish/subscribe primitive. Every other part of
//! the runtime core uses it for lifecycle events: per-frame ticks, state
//! switches, value changes and cross-cutting host events.
//!
//! ## Shape
//! - [`Observer<A>`] is a shared handle around a callback `FnMut(&A)`. The
//!   argument type carries the arity: `()`, `T`, `(T1, T2)` or
//!   `(T1, T2, T3)`.
//! - [`Subject<A>`] is a shared handle around an ordered attachment list.
//!   Cloning either handle clones the reference, not the contents.
//!
//! ```
//! use rift_core::engine::observer::{Observer, Subject};
//!
//! let subject: Subject<(u32, f32)> = Subject::new();
//! let observer = Observer::new(|&(id, amount): &(u32, f32)| {
//!     assert_eq!((id, amount), (7, 2.5));
//! });
//! assert!(subject.attach(&observer, false));
//! subject.notify_all(&(7, 2.5));
//! ```
//!
//! ## Ordering and re-entrancy
//! `notify_all` delivers in attachment order over a snapshot of the list. An
//! observer detached or disposed by an earlier callback in the same pass is
//! skipped. Attachments made during a pass are delivered from the next pass
//! on, including an observer detached and re-attached by an earlier callback:
//! it is skipped at its old position and keeps its new place at the end of the
//! list. Callbacks may attach, detach and dispose freely; a callback that
//! re-enters itself through a nested notification is skipped for the nested
//! call.
//!
//! ## Disposal
//! Both handles carry a disposed flag. Disposing twice is a no-op, notifying a
//! disposed subject is a no-op, and an observer's dispose hook runs at most
//! once no matter how many subjects it was attached to.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::engine::types::ObserverId;


type Callback<A> = Box<dyn FnMut(&A)>;
type DisposeHook = Box<dyn FnOnce()>;

struct ObserverShared<A> {
    disposed: Cell<bool>,
    callback: RefCell<Option<Callback<A>>>,
    on_dispose: RefCell<Option<DisposeHook>>,
}

/// Shared callback handle.
///
/// ## Invariants
/// - Once disposed, the callback is never invoked again.
/// - The dispose hook, if any, runs exactly once.
pub struct Observer<A = ()> {
    id: ObserverId,
    shared: Rc<ObserverShared<A>>,
}

impl<A> Observer<A> {
    /// Wraps `callback` in a new observer.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&A) + 'static,
    {
        Self::from_parts(Box::new(callback), None)
    }

    /// Wraps `callback` and a teardown hook run on the first [`dispose`](Self::dispose).
    pub fn with_dispose<F, D>(callback: F, on_dispose: D) -> Self
    where
        F: FnMut(&A) + 'static,
        D: FnOnce() + 'static,
    {
        Self::from_parts(Box::new(callback), Some(Box::new(on_dispose)))
    }

    /// Builds an observer that forwards to `f` with mutable access to `target`.
    ///
    /// Only a weak reference is kept: once `target` is dropped, or while it is
    /// already mutably borrowed, notifications are ignored.
    pub fn bind<T, F>(target: &Rc<RefCell<T>>, mut f: F) -> Self
    where
        T: 'static,
        F: FnMut(&mut T, &A) + 'static,
    {
        let weak = Rc::downgrade(target);
        Self::new(move |args| {
            let Some(cell) = weak.upgrade() else { return; };
            let Ok(mut target) = cell.try_borrow_mut() else { return; };
            f(&mut *target, args);
        })
    }

    fn from_parts(callback: Callback<A>, on_dispose: Option<DisposeHook>) -> Self {
        Self {
            id: ObserverId::next(),
            shared: Rc::new(ObserverShared {
                disposed: Cell::new(false),
                callback: RefCell::new(Some(callback)),
                on_dispose: RefCell::new(on_dispose),
            }),
        }
    }

    /// Identity shared by every clone of this handle.
    #[inline]
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.get()
    }

    /// Invokes the callback with `args`.
    ///
    /// Returns `false` without calling anything if the observer is disposed or
    /// its callback is already running further up the stack.
    pub fn invoke(&self, args: &A) -> bool {
        if self.shared.disposed.get() {
            return false;
        }

        match self.shared.callback.try_borrow_mut() {
            Ok(mut slot) => match slot.as_mut() {
                Some(callback) => {
                    callback(args);
                    true
                }
                None => false,
            },
            Err(_) => {
                warn!(observer = %self.id, "re-entrant notification skipped");
                false
            }
        }
    }

    /// Disposes the observer: runs the teardown hook and releases the callback.
    ///
    /// Returns `false` if it was already disposed.
    pub fn dispose(&self) -> bool {
        if self.shared.disposed.replace(true) {
            return false;
        }

        let hook = self.shared.on_dispose.borrow_mut().take();
        if let Some(hook) = hook {
            hook();
        }

        // A callback disposing its own observer is still on the stack; it is
        // released when the last handle goes away instead.
        if let Ok(mut slot) = self.shared.callback.try_borrow_mut() {
            slot.take();
        }
        true
    }
}

impl<A> Clone for Observer<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<A> PartialEq for Observer<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for Observer<A> {}

impl<A> fmt::Debug for Observer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

struct Attachment<A> {
    observer: Observer<A>,
    /// Unique per attach call; a re-attached observer gets a new one.
    seq: u64,
    dispose_on_detach: bool,
}

struct SubjectState<A> {
    attachments: Vec<Attachment<A>>,
    /// Bumped on every removal so a notification pass knows when to re-check.
    revision: u64,
    next_seq: u64,
    disposed: bool,
}

/// Broadcast list of observers.
///
/// ## Invariants
/// - An observer appears at most once in the list.
/// - After disposal the list is empty, attachments are rejected and
///   notifications are ignored.
pub struct Subject<A = ()> {
    state: Rc<RefCell<SubjectState<A>>>,
}

impl<A> Subject<A> {
    /// Creates an empty subject.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SubjectState {
                attachments: Vec::new(),
                revision: 0,
                next_seq: 0,
                disposed: false,
            })),
        }
    }

    /// Attaches `observer` at the end of the delivery order.
    ///
    /// With `dispose_on_detach`, detaching the observer (individually, through
    /// [`detach_all`](Self::detach_all) or through [`dispose`](Self::dispose))
    /// also disposes it.
    ///
    /// Returns `false` if it is already attached, if it is disposed, or if the
    /// subject is disposed.
    pub fn attach(&self, observer: &Observer<A>, dispose_on_detach: bool) -> bool {
        let mut state = self.state.borrow_mut();
        if state.disposed || observer.is_disposed() {
            return false;
        }
        if state.attachments.iter().any(|a| a.observer.id == observer.id) {
            return false;
        }

        let seq = state.next_seq;
        state.next_seq = state.next_seq.wrapping_add(1);
        state.attachments.push(Attachment {
            observer: observer.clone(),
            seq,
            dispose_on_detach,
        });
        true
    }

    /// Detaches `observer`. Returns `false` if it was not attached.
    pub fn detach(&self, observer: &Observer<A>) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let Some(position) = state
                .attachments
                .iter()
                .position(|a| a.observer.id == observer.id)
            else {
                return false;
            };
            state.revision = state.revision.wrapping_add(1);
            state.attachments.remove(position)
        };

        if removed.dispose_on_detach {
            removed.observer.dispose();
        }
        true
    }

    /// Detaches every observer, disposing only those attached with
    /// `dispose_on_detach`.
    pub fn detach_all(&self) {
        let removed = {
            let mut state = self.state.borrow_mut();
            state.revision = state.revision.wrapping_add(1);
            std::mem::take(&mut state.attachments)
        };
        Self::release(removed);
    }

    /// Delivers `args` to every attached observer in attachment order.
    pub fn notify_all(&self, args: &A) {
        let (snapshot, revision) = {
            let state = self.state.borrow();
            if state.disposed || state.attachments.is_empty() {
                return;
            }
            let snapshot: Vec<(Observer<A>, u64)> = state
                .attachments
                .iter()
                .map(|a| (a.observer.clone(), a.seq))
                .collect();
            (snapshot, state.revision)
        };

        for (observer, seq) in &snapshot {
            if !self.still_attached(*seq, revision) {
                continue;
            }
            observer.invoke(args);
        }
    }

    /// Detaches everyone and marks the subject dead.
    ///
    /// Returns `false` if it was already disposed.
    pub fn dispose(&self) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return false;
            }
            state.disposed = true;
            state.revision = state.revision.wrapping_add(1);
            std::mem::take(&mut state.attachments)
        };
        Self::release(removed);
        true
    }

    /// Returns `true` if `observer` is currently attached.
    pub fn contains(&self, observer: &Observer<A>) -> bool {
        self.state
            .borrow()
            .attachments
            .iter()
            .any(|a| a.observer.id == observer.id)
    }

    /// Number of attached observers.
    pub fn len(&self) -> usize {
        self.state.borrow().attachments.len()
    }

    /// Returns `true` if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().attachments.is_empty()
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    fn still_attached(&self, seq: u64, revision: u64) -> bool {
        let state = self.state.borrow();
        if state.revision == revision {
            return true;
        }
        state.attachments.iter().any(|a| a.seq == seq)
    }

    fn release(removed: Vec<Attachment<A>>) {
        for attachment in removed {
            if attachment.dispose_on_detach {
                attachment.observer.dispose();
            }
        }
    }
}

impl<A> Default for Subject<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Subject<A> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<A> fmt::Debug for Subject<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Subject")
            .field("observers", &state.attachments.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}
