//! Core runtime types and identifiers.
//!
//! This module defines the small, copyable types shared by every part of the
//! runtime core: the frame delta, the tick phases a component can subscribe
//! to, and the identifiers handed out to observers.
//!
//! ## Tick phases
//!
//! The host engine drives three independent per-frame ticks. The component
//! registry keeps one subject per phase and fans each tick out to the
//! components that opted in:
//!
//! ```text
//! | Update | LateUpdate | FixedUpdate |
//! ```
//!
//! Delivery order inside a phase is attachment order.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};


/// Frame delta handed to every tick, in seconds.
pub type DeltaTime = f32;

/// Number of tick phases driven by the host.
pub const TICK_PHASES: usize = 3;

/// One of the per-frame ticks a component may subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Regular per-frame update.
    Update,
    /// Runs after every `Update` of the frame has been delivered.
    LateUpdate,
    /// Fixed-rate simulation step.
    FixedUpdate,
}

impl TickPhase {
    /// All phases in the order the host usually drives them.
    pub const ALL: [TickPhase; TICK_PHASES] = [
        TickPhase::Update,
        TickPhase::LateUpdate,
        TickPhase::FixedUpdate,
    ];

    /// Dense index used to address per-phase storage.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            TickPhase::Update => 0,
            TickPhase::LateUpdate => 1,
            TickPhase::FixedUpdate => 2,
        }
    }
}

impl fmt::Display for TickPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickPhase::Update => f.write_str("update"),
            TickPhase::LateUpdate => f.write_str("late-update"),
            TickPhase::FixedUpdate => f.write_str("fixed-update"),
        }
    }
}

/// Process-unique identifier of an [`Observer`](crate::engine::observer::Observer).
///
/// Subjects compare observers by this id, so clones of the same handle are
/// recognised as one observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

impl ObserverId {
    /// Allocates a fresh id.
    pub(crate) fn next() -> Self {
        ObserverId(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for diagnostics.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}
