#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rift_core::engine::component::EntityComponent;
use rift_core::engine::key::HashedKey;
use rift_core::engine::machine::StateMachine;
use rift_core::engine::model::EntityModel;
use rift_core::engine::observer::Observer;
use rift_core::engine::state::{MachineArgs, State};
use rift_core::engine::types::DeltaTime;

pub const ENTITIES_SMALL: usize = 1_000;
pub const ENTITIES_MED: usize = 10_000;

pub const OBSERVERS: usize = 256;

#[derive(Default)]
pub struct Body {
    pub position: f32,
    pub velocity: f32,
}

pub struct Mover {
    body: Rc<RefCell<Body>>,
    tick: Observer<DeltaTime>,
}

impl Mover {
    pub fn new() -> Self {
        let body = Rc::new(RefCell::new(Body { position: 0.0, velocity: 1.0 }));
        let tick = Observer::bind(&body, |body: &mut Body, dt: &DeltaTime| {
            body.position += body.velocity * dt;
        });
        Self { body, tick }
    }

    pub fn position(&self) -> f32 {
        self.body.borrow().position
    }
}

impl EntityComponent for Mover {
    fn try_get_update(&self) -> Option<Observer<DeltaTime>> {
        Some(self.tick.clone())
    }

    fn dispose(&mut self) {
        self.tick.dispose();
    }
}

pub struct Stamina {
    value: Rc<RefCell<f32>>,
    regen: Observer<DeltaTime>,
}

impl Stamina {
    pub fn new() -> Self {
        let value = Rc::new(RefCell::new(0.0));
        let regen = Observer::bind(&value, |value: &mut f32, dt: &DeltaTime| {
            *value = (*value + dt).min(100.0);
        });
        Self { value, regen }
    }
}

impl EntityComponent for Stamina {
    fn try_get_update(&self) -> Option<Observer<DeltaTime>> {
        Some(self.regen.clone())
    }

    fn try_get_fixed_update(&self) -> Option<Observer<DeltaTime>> {
        Some(self.regen.clone())
    }
}

/// Tag component with no per-frame work.
pub struct Tag;

impl EntityComponent for Tag {}

pub fn make_models(count: usize) -> Vec<EntityModel<()>> {
    let data = Rc::new(());
    (0..count)
        .map(|_| {
            let mut model = EntityModel::new(Rc::clone(&data));
            model.try_add_component(Mover::new());
            model.try_add_component(Stamina::new());
            model.try_add_component(Tag);
            model
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// State machine fixtures
// ─────────────────────────────────────────────────────────────────────────────

pub const PATROL: HashedKey = HashedKey::const_new("patrol");
pub const CHASE: HashedKey = HashedKey::const_new("chase");
pub const FLEE: HashedKey = HashedKey::const_new("flee");
pub const DEAD: HashedKey = HashedKey::const_new("dead");

#[derive(Default)]
pub struct Brain {
    pub distance: f32,
    pub health: f32,
    pub elapsed: f32,
}

impl MachineArgs for Brain {}

pub struct Timed;

impl State<Brain> for Timed {
    fn update_state(&mut self, args: &mut Brain, delta: DeltaTime) {
        args.elapsed += delta;
        args.distance = (args.distance + delta * 7.0) % 20.0;
        args.health = (args.health - delta).max(0.0);
    }

    fn start_state(&mut self, args: &mut Brain) {
        args.elapsed = 0.0;
    }
}

/// Four-state enemy brain cycling between patrol, chase and flee.
pub fn make_brain() -> StateMachine<Brain> {
    let args = Brain {
        distance: 15.0,
        health: 1_000_000.0,
        elapsed: 0.0,
    };
    let mut machine = StateMachine::with_root(args, PATROL, Timed);
    machine.add_state(CHASE, Timed);
    machine.add_state(FLEE, Timed);
    machine.add_state(DEAD, Timed);

    machine.add_any_transition(DEAD, |b: &Brain| b.health <= 0.0);
    machine.add_transition(PATROL, CHASE, |b: &Brain| b.distance < 5.0);
    machine.add_transition(CHASE, FLEE, |b: &Brain| b.elapsed > 0.5);
    machine.add_transition(CHASE, PATROL, |b: &Brain| b.distance > 10.0);
    machine.add_transition(FLEE, PATROL, |b: &Brain| b.distance > 12.0);
    machine
}
