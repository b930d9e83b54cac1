//! # Rift Core
//!
//! Engine-independent entity runtime core for action games.
//!
//! A host entity (player, enemy, UI screen) owns one [`EntityModel`] and
//! optionally one [`StateMachine`]. Each frame it calls
//! [`EntityModel::update`] (and the late/fixed variants), which fans the tick
//! out to every component that opted in, and [`StateMachine::run`], which
//! evaluates transitions and then updates the active state. Everything is
//! built on the [`Subject`]/[`Observer`] bus.
//!
//! ## Design Goals
//! - Single-threaded, purely reactive to the ticks the host hands in
//! - Structural misuse reported through return values, never panics
//! - Deterministic ordering: attachment order for ticks, registration order
//!   for transitions
//! - Idempotent disposal everywhere

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(dead_code)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Observer bus

pub use engine::observer::{
    Observer,
    Subject,
};

pub use engine::observable::Observable;

// Components

pub use engine::component::{
    AsAny,
    ComponentData,
    EntityComponent,
    ModelData,
};

pub use engine::model::EntityModel;

// State machine

pub use engine::key::HashedKey;

pub use engine::state::{
    MachineArgs,
    State,
};

pub use engine::transition::{
    CompareOp,
    Predicate,
    Threshold,
    Transition,
};

pub use engine::machine::{
    StateChange,
    StateMachine,
};

// Host plumbing

pub use engine::hub::EventHub;

pub use engine::config::{
    CoreConfig,
    MachineConfig,
    RegistryConfig,
    RemoveCurrentPolicy,
};

pub use engine::error::{
    CompareOpError,
    ConfigError,
    CoreError,
    CoreResult,
};

pub use engine::types::{
    DeltaTime,
    ObserverId,
    TickPhase,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used runtime types.
///
/// Import with:
/// ```rust
/// use rift_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        DeltaTime,
        EntityComponent,
        EntityModel,
        HashedKey,
        MachineArgs,
        Observer,
        State,
        StateMachine,
        Subject,
        TickPhase,
        Transition,
    };
}
