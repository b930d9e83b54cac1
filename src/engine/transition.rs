//! # Transitions and Predicates
//!
//! A [`Transition`] is an edge of the state machine: a target [`HashedKey`]
//! plus a guard evaluated against the shared argument bundle.
//!
//! ## Guards
//! - [`Transition::new`] guards the edge with any [`Predicate`]. Closures
//!   `FnMut(&A) -> bool` are predicates through a blanket impl.
//! - [`Transition::when_completed`] fires once the state being left reports
//!   [`State::completed`].
//! - [`Threshold`] compares a value read from the arguments against a constant
//!   using a [`CompareOp`], the form data-authored rules take.
//!
//! ## Lifecycle
//! Transitions are owned by the machine, either in a state's outgoing list or
//! in the machine-wide any-transition list, and disposed with their owner.
//! A disposed transition never matches.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::engine::error::CompareOpError;
use crate::engine::key::HashedKey;
use crate::engine::state::State;


/// Guard condition over the argument bundle `A`.
pub trait Predicate<A> {
    /// Returns `true` when the guarded transition should fire.
    fn evaluate(&mut self, args: &A) -> bool;

    /// Releases resources. Called once when the owning transition is disposed.
    fn dispose(&mut self) {}
}

impl<A, F> Predicate<A> for F
where
    F: FnMut(&A) -> bool,
{
    fn evaluate(&mut self, args: &A) -> bool {
        self(args)
    }
}

enum Guard<A> {
    When(Box<dyn Predicate<A>>),
    Completed,
}

/// Edge to `target`, guarded by a predicate or by source-state completion.
pub struct Transition<A> {
    target: HashedKey,
    guard: Guard<A>,
    disposed: bool,
}

impl<A> Transition<A> {
    /// Edge to `target` taken when `predicate` holds.
    pub fn new<P>(target: HashedKey, predicate: P) -> Self
    where
        P: Predicate<A> + 'static,
    {
        Self {
            target,
            guard: Guard::When(Box::new(predicate)),
            disposed: false,
        }
    }

    /// Edge to `target` taken when the source state reports completion.
    pub fn when_completed(target: HashedKey) -> Self {
        Self {
            target,
            guard: Guard::Completed,
            disposed: false,
        }
    }

    /// Key of the state this edge leads to.
    #[inline]
    pub fn target(&self) -> HashedKey {
        self.target
    }

    /// Evaluates the guard. `source` is the state the machine would leave.
    pub fn evaluate(&mut self, args: &A, source: &dyn State<A>) -> bool {
        if self.disposed {
            return false;
        }
        match &mut self.guard {
            Guard::When(predicate) => predicate.evaluate(args),
            Guard::Completed => source.completed(args),
        }
    }

    /// Disposes the guard. Returns `false` if already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        if let Guard::When(predicate) = &mut self.guard {
            predicate.dispose();
        }
        true
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<A> fmt::Debug for Transition<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = match self.guard {
            Guard::When(_) => "predicate",
            Guard::Completed => "completed",
        };
        f.debug_struct("Transition")
            .field("target", &self.target)
            .field("guard", &guard)
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Comparison operator used by data-authored predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum CompareOp {
    /// `lhs < rhs`
    Less,
    /// `lhs <= rhs`
    LessOrEqual,
    /// `lhs == rhs`
    Equal,
    /// `lhs != rhs`
    NotEqual,
    /// `lhs >= rhs`
    GreaterOrEqual,
    /// `lhs > rhs`
    Greater,
}

impl CompareOp {
    /// Applies the operator.
    pub fn apply<V: PartialOrd + ?Sized>(self, lhs: &V, rhs: &V) -> bool {
        match self {
            CompareOp::Less => lhs < rhs,
            CompareOp::LessOrEqual => lhs <= rhs,
            CompareOp::Equal => lhs == rhs,
            CompareOp::NotEqual => lhs != rhs,
            CompareOp::GreaterOrEqual => lhs >= rhs,
            CompareOp::Greater => lhs > rhs,
        }
    }

    /// Symbolic form, e.g. `<=`.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::GreaterOrEqual => ">=",
            CompareOp::Greater => ">",
        }
    }
}

impl FromStr for CompareOp {
    type Err = CompareOpError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let op = match text.trim() {
            "<" | "less" => CompareOp::Less,
            "<=" | "less_or_equal" => CompareOp::LessOrEqual,
            "==" | "=" | "equal" => CompareOp::Equal,
            "!=" | "not_equal" => CompareOp::NotEqual,
            ">=" | "greater_or_equal" => CompareOp::GreaterOrEqual,
            ">" | "greater" => CompareOp::Greater,
            other => return Err(CompareOpError::Unknown(other.to_string())),
        };
        Ok(op)
    }
}

impl TryFrom<String> for CompareOp {
    type Error = CompareOpError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Predicate comparing a value read from the arguments against a constant.
///
/// ```
/// use rift_core::engine::transition::{CompareOp, Predicate, Threshold};
///
/// struct Ctx { health: f32 }
///
/// let mut dead = Threshold::new(|ctx: &Ctx| ctx.health, CompareOp::LessOrEqual, 0.0);
/// assert!(dead.evaluate(&Ctx { health: 0.0 }));
/// assert!(!dead.evaluate(&Ctx { health: 3.0 }));
/// ```
pub struct Threshold<A, V> {
    read: Box<dyn Fn(&A) -> V>,
    op: CompareOp,
    value: V,
}

impl<A, V> Threshold<A, V> {
    /// Compares `read(args) op value`.
    pub fn new<R>(read: R, op: CompareOp, value: V) -> Self
    where
        R: Fn(&A) -> V + 'static,
    {
        Self {
            read: Box::new(read),
            op,
            value,
        }
    }

    /// Operator in use.
    pub fn op(&self) -> CompareOp {
        self.op
    }
}

impl<A, V: PartialOrd> Predicate<A> for Threshold<A, V> {
    fn evaluate(&mut self, args: &A) -> bool {
        let current = (self.read)(args);
        self.op.apply(&current, &self.value)
    }
}
