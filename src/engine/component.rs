//! # Entity Components
//!
//! Capability units (movement, health, dash, laser, motion controllers) that a
//! host entity registers into its [`EntityModel`].
//!
//! ## Purpose
//! A component is identified by its concrete Rust type. The registry keeps at
//! most one instance per type and asks each component, exactly once when it is
//! added, which per-frame ticks it wants to receive. A component opts in by
//! returning an [`Observer`] from the matching `try_get_*` method; the registry
//! attaches it to the phase subject and detaches it on removal.
//!
//! ## Sharing state with tick observers
//! Observers are `'static` callbacks, so a component that mutates itself on a
//! tick keeps that state behind `Rc<RefCell<_>>` and builds its observer with
//! [`Observer::bind`]:
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//! use rift_core::engine::component::EntityComponent;
//! use rift_core::engine::observer::Observer;
//! use rift_core::engine::types::DeltaTime;
//!
//! struct Regen { hp: f32 }
//!
//! struct RegenComponent {
//!     state: Rc<RefCell<Regen>>,
//!     tick: Observer<DeltaTime>,
//! }
//!
//! impl RegenComponent {
//!     fn new() -> Self {
//!         let state = Rc::new(RefCell::new(Regen { hp: 0.0 }));
//!         let tick = Observer::bind(&state, |regen: &mut Regen, dt: &DeltaTime| regen.hp += dt);
//!         Self { state, tick }
//!     }
//! }
//!
//! impl EntityComponent for RegenComponent {
//!     fn try_get_update(&self) -> Option<Observer<DeltaTime>> {
//!         Some(self.tick.clone())
//!     }
//!
//!     fn dispose(&mut self) {
//!         self.tick.dispose();
//!     }
//! }
//! ```
//!
//! ## Data assets
//! Components are usually built from immutable configuration through
//! [`ComponentData`]; a whole entity is populated from a [`ModelData`] asset.

use std::any::Any;

use crate::engine::model::EntityModel;
use crate::engine::observer::Observer;
use crate::engine::types::{DeltaTime, TickPhase, TICK_PHASES};


/// Upcasting helper implemented for every `'static` type.
pub trait AsAny: Any {
    /// Borrows `self` as `dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Mutably borrows `self` as `dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Converts a boxed value into `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A capability unit registered into an [`EntityModel`].
///
/// Every method has a default, so a component with no per-frame work only
/// needs an empty `impl`.
pub trait EntityComponent: AsAny {
    /// Observer driven by the registry's `update` tick, if any.
    fn try_get_update(&self) -> Option<Observer<DeltaTime>> {
        None
    }

    /// Observer driven by the registry's `late_update` tick, if any.
    fn try_get_late_update(&self) -> Option<Observer<DeltaTime>> {
        None
    }

    /// Observer driven by the registry's `fixed_update` tick, if any.
    fn try_get_fixed_update(&self) -> Option<Observer<DeltaTime>> {
        None
    }

    /// Releases resources. Called once when the registry disposes the component.
    fn dispose(&mut self) {}
}

/// Collects the observers a component opts into, indexed by [`TickPhase::index`].
pub(crate) fn tick_observers(
    component: &dyn EntityComponent,
) -> [Option<Observer<DeltaTime>>; TICK_PHASES] {
    let mut observers: [Option<Observer<DeltaTime>>; TICK_PHASES] = [None, None, None];
    for phase in TickPhase::ALL {
        observers[phase.index()] = match phase {
            TickPhase::Update => component.try_get_update(),
            TickPhase::LateUpdate => component.try_get_late_update(),
            TickPhase::FixedUpdate => component.try_get_fixed_update(),
        };
    }
    observers
}

/// Immutable configuration that knows how to build one component.
pub trait ComponentData {
    /// Component type produced by this asset.
    type Component: EntityComponent;

    /// Builds a fresh component instance.
    fn build(&self) -> Self::Component;
}

/// Immutable configuration asset backing a whole [`EntityModel`].
///
/// [`EntityModel::from_data`] and [`EntityModel::reset`] call
/// [`populate`](Self::populate) to (re)register the entity's components.
pub trait ModelData: Sized + 'static {
    /// Registers this asset's components into `model`.
    fn populate(&self, model: &mut EntityModel<Self>);
}
