//! State behaviour hooks and the shared argument bundle.
//!
//! A [`State`] is a named unit of behaviour registered into a
//! [`StateMachine`](crate::engine::machine::StateMachine). The machine owns it
//! and calls its hooks with the host-defined argument bundle `A`.
//!
//! ## Hook order
//! ```text
//! init (once, on registration)
//!   start_state -> update_state* -> exit_state   (per activation)
//! dispose (once, on removal or machine disposal)
//! ```

use crate::engine::types::DeltaTime;


/// Host-defined context passed into every state and predicate call.
///
/// The machine disposes its bundle exactly once, when it is disposed.
pub trait MachineArgs {
    /// Releases resources held by the bundle.
    fn dispose(&mut self) {}
}

impl MachineArgs for () {}

/// Behaviour hooks of one state. Every hook defaults to doing nothing.
pub trait State<A> {
    /// Called once, immediately after the state is registered.
    fn init(&mut self, _args: &mut A) {}

    /// Called each time the state becomes current.
    fn start_state(&mut self, _args: &mut A) {}

    /// Called once per machine tick while the state is current.
    fn update_state(&mut self, _args: &mut A, _delta: DeltaTime) {}

    /// Called each time the state stops being current.
    fn exit_state(&mut self, _args: &mut A) {}

    /// Whether the state considers its work done.
    ///
    /// Drives transitions built with
    /// [`Transition::when_completed`](crate::engine::transition::Transition::when_completed).
    fn completed(&self, _args: &A) -> bool {
        false
    }

    /// Releases resources. Called once when the machine drops the state.
    fn dispose(&mut self) {}
}
