//! # Entity Model
//!
//! Per-entity component registry with per-frame tick fan-out.
//!
//! ## Purpose
//! A host entity (player, enemy, UI mediator) owns exactly one
//! [`EntityModel`]. It maps each component's concrete type to the single
//! registered instance and keeps one [`Subject`] per [`TickPhase`]. Hosts call
//! [`update`](EntityModel::update), [`late_update`](EntityModel::late_update)
//! and [`fixed_update`](EntityModel::fixed_update) from their frame loop; the
//! subjects forward each tick to the components that opted in.
//!
//! ## Design
//! - Components live in an insertion-ordered map keyed by `TypeId`, so lookups
//!   are O(1) and bulk teardown visits components in registration order.
//! - Tick observers are collected once, when the component is added, and kept
//!   next to it so removal can detach exactly what was attached.
//! - The backing data asset is shared (`Rc`) and released on disposal.
//!
//! ## Invariants
//! - At most one component per concrete type.
//! - A registered component's observers are attached to their phase subjects
//!   for as long as it is registered, and to nothing else by this registry.
//! - Disposal disposes every registered component exactly once and leaves the
//!   registry inert: later calls are no-ops returning `false`.

use std::any::{type_name, TypeId};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tracing::trace;

use crate::engine::component::{tick_observers, ComponentData, EntityComponent, ModelData};
use crate::engine::config::RegistryConfig;
use crate::engine::observer::{Observer, Subject};
use crate::engine::types::{DeltaTime, TickPhase, TICK_PHASES};


/// A registered component plus the observers it contributed.
struct ComponentEntry {
    component: Box<dyn EntityComponent>,
    observers: [Option<Observer<DeltaTime>>; TICK_PHASES],
    name: &'static str,
}

/// Type-keyed component registry for one host entity.
///
/// `D` is the immutable configuration asset the entity was created from.
pub struct EntityModel<D> {
    data: Option<Rc<D>>,
    components: IndexMap<TypeId, ComponentEntry, FxBuildHasher>,
    subjects: [Subject<DeltaTime>; TICK_PHASES],
    disposed: bool,
}

impl<D> EntityModel<D> {
    /// Creates an empty registry backed by `data`.
    pub fn new(data: Rc<D>) -> Self {
        Self::with_capacity(data, 0)
    }

    /// Creates an empty registry pre-sized for `capacity` components.
    pub fn with_capacity(data: Rc<D>, capacity: usize) -> Self {
        Self {
            data: Some(data),
            components: IndexMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            subjects: [Subject::new(), Subject::new(), Subject::new()],
            disposed: false,
        }
    }

    /// Creates an empty registry sized from `config`.
    pub fn with_config(data: Rc<D>, config: &RegistryConfig) -> Self {
        Self::with_capacity(data, config.initial_capacity)
    }

    /// Backing data asset, until [`dispose`](Self::dispose) releases it.
    pub fn data(&self) -> Option<&D> {
        self.data.as_deref()
    }

    /// Registers `component` under its concrete type `T`.
    ///
    /// Fails (and drops `component`) if a `T` is already registered or the
    /// registry is disposed. On success, every tick observer the component
    /// offers is attached to the matching phase subject.
    pub fn try_add_component<T: EntityComponent>(&mut self, component: T) -> bool {
        if self.disposed {
            return false;
        }

        let type_id = TypeId::of::<T>();
        if self.components.contains_key(&type_id) {
            trace!(component = type_name::<T>(), "component already registered");
            return false;
        }

        let observers = tick_observers(&component);
        for phase in TickPhase::ALL {
            if let Some(observer) = &observers[phase.index()] {
                self.subjects[phase.index()].attach(observer, false);
            }
        }

        self.components.insert(
            type_id,
            ComponentEntry {
                component: Box::new(component),
                observers,
                name: type_name::<T>(),
            },
        );
        trace!(component = type_name::<T>(), "component added");
        true
    }

    /// Builds a component from `data` and registers it.
    ///
    /// The component is only built if its type is not registered yet.
    pub fn try_add_from<C: ComponentData>(&mut self, data: &C) -> bool {
        if self.disposed || self.has_component::<C::Component>() {
            return false;
        }
        self.try_add_component(data.build())
    }

    /// Borrows the registered `T`, if any.
    pub fn try_get_component<T: EntityComponent>(&self) -> Option<&T> {
        let entry = self.components.get(&TypeId::of::<T>())?;
        (*entry.component).as_any().downcast_ref::<T>()
    }

    /// Mutably borrows the registered `T`, if any.
    pub fn try_get_component_mut<T: EntityComponent>(&mut self) -> Option<&mut T> {
        let entry = self.components.get_mut(&TypeId::of::<T>())?;
        (*entry.component).as_any_mut().downcast_mut::<T>()
    }

    /// Returns `true` if a `T` is registered.
    pub fn has_component<T: EntityComponent>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<T>())
    }

    /// Unregisters `T`, detaching its tick observers.
    ///
    /// With `dispose_component`, the component and its observers are disposed
    /// as well. Returns `false` if no `T` is registered.
    pub fn remove_component<T: EntityComponent>(&mut self, dispose_component: bool) -> bool {
        let Some(entry) = self.detach_entry(TypeId::of::<T>()) else {
            return false;
        };
        if dispose_component {
            Self::dispose_entry(entry);
        }
        trace!(component = type_name::<T>(), dispose_component, "component removed");
        true
    }

    /// Unregisters `T` without disposing it and hands it back.
    pub fn take_component<T: EntityComponent>(&mut self) -> Option<T> {
        let entry = self.detach_entry(TypeId::of::<T>())?;
        trace!(component = type_name::<T>(), "component taken");
        entry.component.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Detaches everything from all phase subjects, disposes every component
    /// and clears the map.
    pub fn remove_all_components(&mut self) {
        for subject in &self.subjects {
            subject.detach_all();
        }
        for (_, entry) in self.components.drain(..) {
            Self::dispose_entry(entry);
        }
    }

    /// Delivers an `Update` tick to every opted-in component.
    pub fn update(&self, delta: DeltaTime) {
        self.tick(TickPhase::Update, delta);
    }

    /// Delivers a `LateUpdate` tick to every opted-in component.
    pub fn late_update(&self, delta: DeltaTime) {
        self.tick(TickPhase::LateUpdate, delta);
    }

    /// Delivers a `FixedUpdate` tick to every opted-in component.
    pub fn fixed_update(&self, delta: DeltaTime) {
        self.tick(TickPhase::FixedUpdate, delta);
    }

    /// Delivers a tick for `phase` in attachment order.
    pub fn tick(&self, phase: TickPhase, delta: DeltaTime) {
        self.subjects[phase.index()].notify_all(&delta);
    }

    /// Number of observers subscribed to `phase`.
    pub fn subscriber_count(&self, phase: TickPhase) -> usize {
        self.subjects[phase.index()].len()
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if no component is registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Registered component types in registration order.
    pub fn component_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.components.keys().copied()
    }

    /// Registered component type names in registration order.
    pub fn component_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.components.values().map(|entry| entry.name)
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Tears the registry down: removes and disposes every component, disposes
    /// the phase subjects and releases the data asset.
    ///
    /// Returns `false` if it was already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.remove_all_components();
        for subject in &self.subjects {
            subject.dispose();
        }
        self.data = None;
        self.disposed = true;
        true
    }

    fn detach_entry(&mut self, type_id: TypeId) -> Option<ComponentEntry> {
        let entry = self.components.shift_remove(&type_id)?;
        for phase in TickPhase::ALL {
            if let Some(observer) = &entry.observers[phase.index()] {
                self.subjects[phase.index()].detach(observer);
            }
        }
        Some(entry)
    }

    fn dispose_entry(mut entry: ComponentEntry) {
        for observer in entry.observers.iter().flatten() {
            observer.dispose();
        }
        entry.component.dispose();
    }
}

impl<D: ModelData> EntityModel<D> {
    /// Creates a registry and lets `data` populate it.
    pub fn from_data(data: Rc<D>) -> Self {
        let mut model = Self::new(Rc::clone(&data));
        data.populate(&mut model);
        model
    }

    /// Clears every component and repopulates from the data asset.
    ///
    /// Returns `false` if the registry is disposed.
    pub fn reset(&mut self) -> bool {
        let Some(data) = self.data.clone() else {
            return false;
        };
        self.remove_all_components();
        data.populate(self);
        true
    }
}

impl<D> Drop for EntityModel<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<D> fmt::Debug for EntityModel<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityModel")
            .field("components", &self.components.values().map(|e| e.name).collect::<Vec<_>>())
            .field("disposed", &self.disposed)
            .finish()
    }
}
