#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;

use rift_core::prelude::*;
use rift_core::Predicate;

static TRACING: Once = Once::new();

/// Routes `tracing` output to the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "rift_core=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.borrow().clone()
}

pub type Counter = Rc<Cell<u32>>;

pub fn counter() -> Counter {
    Rc::new(Cell::new(0))
}

fn bump(counter: &Counter) {
    counter.set(counter.get() + 1);
}

fn recording(log: &CallLog, label: &'static str) -> Observer<DeltaTime> {
    let log = Rc::clone(log);
    Observer::new(move |dt: &DeltaTime| log.borrow_mut().push(format!("{label}:{dt}")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────────────────

/// Ticks on `Update` only.
pub struct Health {
    pub value: f32,
    pub disposals: Counter,
    update: Observer<DeltaTime>,
}

impl Health {
    pub fn new(log: &CallLog) -> Self {
        Self {
            value: 100.0,
            disposals: counter(),
            update: recording(log, "health"),
        }
    }

    pub fn update_observer(&self) -> Observer<DeltaTime> {
        self.update.clone()
    }
}

impl EntityComponent for Health {
    fn try_get_update(&self) -> Option<Observer<DeltaTime>> {
        Some(self.update.clone())
    }

    fn dispose(&mut self) {
        bump(&self.disposals);
        self.update.dispose();
    }
}

/// No per-frame work at all.
pub struct Dash {
    pub charges: u32,
    pub disposals: Counter,
}

impl Dash {
    pub fn new() -> Self {
        Self {
            charges: 2,
            disposals: counter(),
        }
    }
}

impl EntityComponent for Dash {
    fn dispose(&mut self) {
        bump(&self.disposals);
    }
}

/// Ticks on `LateUpdate` and `FixedUpdate`.
pub struct Laser {
    pub disposals: Counter,
    late: Observer<DeltaTime>,
    fixed: Observer<DeltaTime>,
}

impl Laser {
    pub fn new(log: &CallLog) -> Self {
        Self {
            disposals: counter(),
            late: recording(log, "laser-late"),
            fixed: recording(log, "laser-fixed"),
        }
    }
}

impl EntityComponent for Laser {
    fn try_get_late_update(&self) -> Option<Observer<DeltaTime>> {
        Some(self.late.clone())
    }

    fn try_get_fixed_update(&self) -> Option<Observer<DeltaTime>> {
        Some(self.fixed.clone())
    }

    fn dispose(&mut self) {
        bump(&self.disposals);
        self.late.dispose();
        self.fixed.dispose();
    }
}

/// Offers one observer for both `Update` and `LateUpdate`.
pub struct Motion {
    pub observer_disposals: Counter,
    shared: Observer<DeltaTime>,
}

impl Motion {
    pub fn new(log: &CallLog) -> Self {
        let observer_disposals = counter();
        let hook = Rc::clone(&observer_disposals);
        let log = Rc::clone(log);
        let shared = Observer::with_dispose(
            move |dt: &DeltaTime| log.borrow_mut().push(format!("motion:{dt}")),
            move || bump(&hook),
        );
        Self {
            observer_disposals,
            shared,
        }
    }
}

impl EntityComponent for Motion {
    fn try_get_update(&self) -> Option<Observer<DeltaTime>> {
        Some(self.shared.clone())
    }

    fn try_get_late_update(&self) -> Option<Observer<DeltaTime>> {
        Some(self.shared.clone())
    }

    fn dispose(&mut self) {
        self.shared.dispose();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// States
// ─────────────────────────────────────────────────────────────────────────────

/// Argument bundle used by the state machine tests.
pub struct Ctx {
    pub moving: bool,
    pub health: f32,
    pub disposals: Counter,
}

impl Ctx {
    pub fn new() -> Self {
        Self {
            moving: false,
            health: 100.0,
            disposals: counter(),
        }
    }
}

impl MachineArgs for Ctx {
    fn dispose(&mut self) {
        bump(&self.disposals);
    }
}

/// State that records every hook call as `name:hook`.
pub struct Recorder {
    name: &'static str,
    log: CallLog,
    pub done: Rc<Cell<bool>>,
    pub disposals: Counter,
}

impl Recorder {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: Rc::clone(log),
            done: Rc::new(Cell::new(false)),
            disposals: counter(),
        }
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{hook}", self.name));
    }
}

impl<A> State<A> for Recorder {
    fn init(&mut self, _args: &mut A) {
        self.record("init");
    }

    fn start_state(&mut self, _args: &mut A) {
        self.record("start");
    }

    fn update_state(&mut self, _args: &mut A, _delta: DeltaTime) {
        self.record("update");
    }

    fn exit_state(&mut self, _args: &mut A) {
        self.record("exit");
    }

    fn completed(&self, _args: &A) -> bool {
        self.done.get()
    }

    fn dispose(&mut self) {
        bump(&self.disposals);
        self.record("dispose");
    }
}

/// Guard with a fixed answer that counts its `dispose` calls.
pub struct CountingGuard {
    open: bool,
    pub disposals: Counter,
}

impl CountingGuard {
    pub fn new(open: bool) -> Self {
        Self {
            open,
            disposals: counter(),
        }
    }
}

impl<A> Predicate<A> for CountingGuard {
    fn evaluate(&mut self, _args: &A) -> bool {
        self.open
    }

    fn dispose(&mut self) {
        bump(&self.disposals);
    }
}
