//! # Event Hub
//!
//! Explicitly owned collection of subjects, one per event type.
//!
//! ## Purpose
//! Cross-cutting notifications (pause and resume, level changed, enemy
//! killed) reach many unrelated modules. Instead of process-wide static
//! subjects, the host creates one [`EventHub`], passes it down to whatever
//! needs to publish or subscribe, and disposes it on teardown. Tests create
//! their own hub and never share state.
//!
//! ## Design
//! - Subjects are keyed by the event's `TypeId` and created lazily on first
//!   subscription.
//! - Publishing an event nobody subscribed to is a no-op and allocates nothing.
//! - Disposal disposes every subject; later subscriptions are rejected.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::engine::observer::{Observer, Subject};


/// Type-erased view of a `Subject<E>` so the hub can dispose it.
trait ErasedSubject {
    fn as_any(&self) -> &dyn Any;
    fn dispose(&self);
    fn len(&self) -> usize;
}

impl<E: 'static> ErasedSubject for Subject<E> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dispose(&self) {
        Subject::dispose(self);
    }

    fn len(&self) -> usize {
        Subject::len(self)
    }
}

/// One subject per event type, owned by the host.
#[derive(Default)]
pub struct EventHub {
    subjects: FxHashMap<TypeId, Box<dyn ErasedSubject>>,
    disposed: bool,
}

impl EventHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subject for events of type `E`, created on first use.
    ///
    /// Returns `None` once the hub is disposed.
    pub fn subject<E: 'static>(&mut self) -> Option<Subject<E>> {
        if self.disposed {
            return None;
        }
        let erased = self
            .subjects
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Subject::<E>::new()));
        erased.as_any().downcast_ref::<Subject<E>>().cloned()
    }

    /// Attaches `observer` to events of type `E`.
    pub fn subscribe<E: 'static>(&mut self, observer: &Observer<E>) -> bool {
        match self.subject::<E>() {
            Some(subject) => subject.attach(observer, false),
            None => false,
        }
    }

    /// Detaches `observer` from events of type `E`.
    pub fn unsubscribe<E: 'static>(&self, observer: &Observer<E>) -> bool {
        self.existing::<E>()
            .map_or(false, |subject| subject.detach(observer))
    }

    /// Delivers `event` to every subscriber of `E`.
    pub fn publish<E: 'static>(&self, event: &E) {
        if let Some(subject) = self.existing::<E>() {
            trace!(event = type_name::<E>(), subscribers = subject.len(), "publish");
            subject.notify_all(event);
        }
    }

    /// Number of subscribers to `E`.
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.existing::<E>().map_or(0, Subject::len)
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Disposes every subject. Returns `false` if already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        for (_, subject) in self.subjects.drain() {
            subject.dispose();
        }
        true
    }

    fn existing<E: 'static>(&self) -> Option<&Subject<E>> {
        self.subjects
            .get(&TypeId::of::<E>())
            .and_then(|erased| erased.as_any().downcast_ref::<Subject<E>>())
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers: usize = self.subjects.values().map(|s| s.len()).sum();
        f.debug_struct("EventHub")
            .field("event_types", &self.subjects.len())
            .field("subscribers", &subscribers)
            .field("disposed", &self.disposed)
            .finish()
    }
}
