//! Value cells that broadcast changes.
//!
//! Capability components (health, stamina, combo counters) expose their
//! tracked values as [`Observable`]s so UI mediators and other components can
//! react to changes without polling.

use std::fmt;

use crate::engine::observer::{Observer, Subject};


/// A value plus a subject notified with `(old, new)` whenever it changes.
pub struct Observable<T> {
    value: T,
    changed: Subject<(T, T)>,
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Wraps `value`.
    pub fn new(value: T) -> Self {
        Self {
            value,
            changed: Subject::new(),
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Stores `value`, notifying observers if it differs from the current one.
    ///
    /// Returns `true` if the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        let old = std::mem::replace(&mut self.value, value);
        self.changed.notify_all(&(old, self.value.clone()));
        true
    }

    /// Stores `value` without notifying anyone.
    pub fn set_silently(&mut self, value: T) {
        self.value = value;
    }

    /// Subject notified on change; attach observers here.
    pub fn on_changed(&self) -> &Subject<(T, T)> {
        &self.changed
    }

    /// Shorthand for attaching `observer` to [`on_changed`](Self::on_changed).
    pub fn subscribe(&self, observer: &Observer<(T, T)>) -> bool {
        self.changed.attach(observer, false)
    }

    /// Disposes the change subject. The value stays readable.
    pub fn dispose(&self) -> bool {
        self.changed.dispose()
    }
}

impl<T: Clone + PartialEq + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("changed", &self.changed)
            .finish()
    }
}
