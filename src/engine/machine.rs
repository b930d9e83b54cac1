//! # Hashed-Key State Machine
//!
//! Generic finite-state machine keyed by [`HashedKey`], driving [`State`]
//! hooks with a host-defined argument bundle `A`.
//!
//! ## Tick model
//! Each [`run`](StateMachine::run) call:
//! 1. skips the tick (logging an error) if no state is current;
//! 2. evaluates the any-transitions in registration order, first match wins;
//! 3. otherwise evaluates the current state's own transitions in registration
//!    order, first match wins;
//! 4. switches to the matched target through [`set_state`](StateMachine::set_state),
//!    which fires `exit_state` on the old state and `start_state` on the new
//!    one, unless the target already is current;
//! 5. calls `update_state` exactly once on whichever state is current now.
//!
//! ## Invariants
//! - Once a state has been activated, `current` always names a registered
//!   state. Removing the current state is refused or preceded by a switch to
//!   the root, per [`RemoveCurrentPolicy`].
//! - A switch to the already-current key fires no hooks.
//! - Every registered state, every transition and the argument bundle are
//!   disposed exactly once, on removal or on machine disposal.
//!
//! ## Failure semantics
//! Structural misuse returns `false` and changes nothing. A tick with no
//! current state is logged and skipped; the host keeps running.

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::{debug, error, warn};

use crate::engine::config::{MachineConfig, RemoveCurrentPolicy};
use crate::engine::key::HashedKey;
use crate::engine::observer::Subject;
use crate::engine::state::{MachineArgs, State};
use crate::engine::transition::Transition;
use crate::engine::types::DeltaTime;


/// Event broadcast after every actual state switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    /// State that was left; `None` for the first activation.
    pub from: Option<HashedKey>,

    /// State that became current.
    pub to: HashedKey,
}

/// A registered state and its outgoing transitions.
struct StateSlot<A> {
    state: Box<dyn State<A>>,
    transitions: Vec<Transition<A>>,
}

impl<A> StateSlot<A> {
    fn dispose(&mut self) {
        for transition in &mut self.transitions {
            transition.dispose();
        }
        self.transitions.clear();
        self.state.dispose();
    }
}

/// Finite-state machine over hashed keys.
pub struct StateMachine<A: MachineArgs> {
    states: FxHashMap<HashedKey, StateSlot<A>>,
    current: Option<HashedKey>,
    root: Option<HashedKey>,
    any_transitions: Vec<Transition<A>>,
    args: A,
    changed: Subject<StateChange>,
    config: MachineConfig,
    disposed: bool,
}

impl<A: MachineArgs> StateMachine<A> {
    /// Creates a machine with no states.
    pub fn new(args: A) -> Self {
        Self::with_config(args, MachineConfig::default())
    }

    /// Creates a machine with no states using `config`.
    pub fn with_config(args: A, config: MachineConfig) -> Self {
        Self {
            states: FxHashMap::default(),
            current: None,
            root: None,
            any_transitions: Vec::new(),
            args,
            changed: Subject::new(),
            config,
            disposed: false,
        }
    }

    /// Creates a machine whose root state `state` is registered under `key`
    /// and already active.
    pub fn with_root<S>(args: A, key: HashedKey, state: S) -> Self
    where
        S: State<A> + 'static,
    {
        let mut machine = Self::new(args);
        machine.add_state(key, state);
        machine.set_root_state(key);
        machine.set_state(key);
        machine
    }

    /// Registers `state` under `key` and calls its `init` hook.
    ///
    /// Returns `false` if `key` is taken or the machine is disposed.
    pub fn add_state<S>(&mut self, key: HashedKey, state: S) -> bool
    where
        S: State<A> + 'static,
    {
        if self.disposed || self.states.contains_key(&key) {
            return false;
        }

        let mut slot = StateSlot {
            state: Box::new(state),
            transitions: Vec::new(),
        };
        slot.state.init(&mut self.args);
        self.states.insert(key, slot);
        true
    }

    /// Removes the state under `key`, disposing it and its transitions.
    ///
    /// Removing the current state follows the configured
    /// [`RemoveCurrentPolicy`]. Removing the root clears the root key.
    pub fn remove_state(&mut self, key: HashedKey) -> bool {
        if self.disposed || !self.states.contains_key(&key) {
            return false;
        }

        if self.current == Some(key) {
            match self.config.on_remove_current {
                RemoveCurrentPolicy::Reject => {
                    warn!(state = %key, "refusing to remove the current state");
                    return false;
                }
                RemoveCurrentPolicy::ResetToRoot => {
                    let root = self.root.filter(|root| *root != key);
                    let switched = match root {
                        Some(root) => self.set_state(root),
                        None => false,
                    };
                    if !switched {
                        warn!(state = %key, "cannot leave the current state before removing it");
                        return false;
                    }
                }
            }
        }

        let Some(mut slot) = self.states.remove(&key) else {
            return false;
        };
        slot.dispose();
        if self.root == Some(key) {
            self.root = None;
        }
        true
    }

    /// Adds a transition out of `from` to `to`, taken when `predicate` holds.
    ///
    /// Returns `false` if `from` is not registered or the machine is disposed.
    pub fn add_transition<F>(&mut self, from: HashedKey, to: HashedKey, predicate: F) -> bool
    where
        F: FnMut(&A) -> bool + 'static,
    {
        self.add_transition_object(from, Transition::new(to, predicate))
    }

    /// Adds a pre-built transition out of `from`.
    pub fn add_transition_object(&mut self, from: HashedKey, transition: Transition<A>) -> bool {
        if self.disposed {
            return false;
        }
        let Some(slot) = self.states.get_mut(&from) else {
            return false;
        };
        slot.transitions.push(transition);
        true
    }

    /// Adds a machine-wide transition to `target`, checked before the current
    /// state's own transitions on every tick.
    pub fn add_any_transition<F>(&mut self, target: HashedKey, predicate: F) -> bool
    where
        F: FnMut(&A) -> bool + 'static,
    {
        self.add_any_transition_object(Transition::new(target, predicate))
    }

    /// Adds a pre-built machine-wide transition.
    ///
    /// Returns `false` if the machine is disposed.
    pub fn add_any_transition_object(&mut self, transition: Transition<A>) -> bool {
        if self.disposed {
            return false;
        }
        self.any_transitions.push(transition);
        true
    }

    /// Records `key` as the root state without activating it.
    ///
    /// Returns `false` if `key` is not registered.
    pub fn set_root_state(&mut self, key: HashedKey) -> bool {
        if self.disposed || !self.states.contains_key(&key) {
            return false;
        }
        self.root = Some(key);
        true
    }

    /// Makes `key` the current state.
    ///
    /// Calls `exit_state` on the outgoing state, swaps, then calls
    /// `start_state` on the incoming one and notifies
    /// [`state_changed`](Self::state_changed). Returns `false`, firing
    /// nothing, if `key` already is current, is not registered, or the
    /// machine is disposed.
    pub fn set_state(&mut self, key: HashedKey) -> bool {
        if self.disposed || self.current == Some(key) || !self.states.contains_key(&key) {
            return false;
        }

        let from = self.current;
        if let Some(slot) = from.and_then(|from| self.states.get_mut(&from)) {
            slot.state.exit_state(&mut self.args);
        }

        self.current = Some(key);
        if let Some(slot) = self.states.get_mut(&key) {
            slot.state.start_state(&mut self.args);
        }

        if self.config.trace_transitions {
            debug!(from = ?from, to = %key, "state changed");
        }
        self.changed.notify_all(&StateChange { from, to: key });
        true
    }

    /// Switches back to the root state.
    ///
    /// Returns `false` if there is no root or it is already current.
    pub fn reset(&mut self) -> bool {
        match self.root {
            Some(root) => self.set_state(root),
            None => false,
        }
    }

    /// Advances the machine by one tick.
    ///
    /// Returns the new current key if a transition switched states.
    pub fn run(&mut self, delta: DeltaTime) -> Option<HashedKey> {
        if self.disposed {
            debug!("run on a disposed state machine ignored");
            return None;
        }

        let Some(current) = self.current else {
            error!("state machine has no current state; tick skipped");
            return None;
        };
        if !self.states.contains_key(&current) {
            error!(state = %current, "current state is not registered; tick skipped");
            return None;
        }

        let mut switched = None;
        if let Some(target) = self.select_transition(current) {
            if target != current {
                if self.set_state(target) {
                    switched = Some(target);
                } else {
                    warn!(from = %current, to = %target, "transition target is not registered");
                }
            }
        }

        if let Some(slot) = self.current.and_then(|key| self.states.get_mut(&key)) {
            slot.state.update_state(&mut self.args, delta);
        }
        switched
    }

    /// Target of the first matching transition: any-transitions first, then
    /// the current state's own.
    fn select_transition(&mut self, current: HashedKey) -> Option<HashedKey> {
        let Self {
            states,
            any_transitions,
            args,
            ..
        } = self;
        let StateSlot { state, transitions } = states.get_mut(&current)?;
        let source: &dyn State<A> = &**state;
        let args: &A = args;

        any_transitions
            .iter_mut()
            .chain(transitions.iter_mut())
            .find_map(|transition| {
                transition
                    .evaluate(args, source)
                    .then(|| transition.target())
            })
    }

    /// Key of the current state.
    pub fn current(&self) -> Option<HashedKey> {
        self.current
    }

    /// The current state.
    pub fn current_state(&self) -> Option<&dyn State<A>> {
        let key = self.current?;
        self.states.get(&key).map(|slot| &*slot.state)
    }

    /// The current state, mutably.
    pub fn current_state_mut(&mut self) -> Option<&mut (dyn State<A> + 'static)> {
        let key = self.current?;
        self.states.get_mut(&key).map(|slot| &mut *slot.state)
    }

    /// Whether the current state reports completion.
    pub fn current_completed(&self) -> bool {
        self.current_state()
            .map(|state| state.completed(&self.args))
            .unwrap_or(false)
    }

    /// The state registered under `key`.
    pub fn state(&self, key: HashedKey) -> Option<&dyn State<A>> {
        self.states.get(&key).map(|slot| &*slot.state)
    }

    /// Key recorded by [`set_root_state`](Self::set_root_state).
    pub fn root(&self) -> Option<HashedKey> {
        self.root
    }

    /// Returns `true` if a state is registered under `key`.
    pub fn contains_state(&self, key: HashedKey) -> bool {
        self.states.contains_key(&key)
    }

    /// Number of registered states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of transitions out of `key`.
    pub fn transition_count(&self, key: HashedKey) -> usize {
        self.states.get(&key).map_or(0, |slot| slot.transitions.len())
    }

    /// Number of machine-wide transitions.
    pub fn any_transition_count(&self) -> usize {
        self.any_transitions.len()
    }

    /// Shared argument bundle.
    pub fn args(&self) -> &A {
        &self.args
    }

    /// Shared argument bundle, mutably.
    pub fn args_mut(&mut self) -> &mut A {
        &mut self.args
    }

    /// Subject notified after every state switch.
    pub fn state_changed(&self) -> &Subject<StateChange> {
        &self.changed
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Disposes every state and transition, then the argument bundle.
    ///
    /// Afterwards `run` is a no-op and every mutating call returns `false`.
    /// Returns `false` if already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;

        for slot in self.states.values_mut() {
            slot.dispose();
        }
        self.states.clear();

        for transition in &mut self.any_transitions {
            transition.dispose();
        }
        self.any_transitions.clear();

        self.args.dispose();
        self.changed.dispose();
        self.current = None;
        self.root = None;
        true
    }
}

impl<A: MachineArgs> Drop for StateMachine<A> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<A: MachineArgs> fmt::Debug for StateMachine<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("root", &self.root)
            .field("states", &self.states.len())
            .field("any_transitions", &self.any_transitions.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}
