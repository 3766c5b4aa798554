//! First-class board invariants.
//!
//! Invariants are properties that hold after every placement. They are
//! asserted in debug builds and can be checked independently in tests.

pub mod gravity;
pub mod monotonic_board;

pub use gravity::GravityInvariant;
pub use monotonic_board::MonotonicBoardInvariant;

use super::Board;
use tracing::error;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Invariant violated: {}", description)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Every board invariant.
pub type BoardInvariants = (MonotonicBoardInvariant, GravityInvariant);

/// Panics if any board invariant is violated.
pub fn assert_invariants(board: &Board) {
    if let Err(violations) = BoardInvariants::check_all(board) {
        for violation in &violations {
            error!(%violation, "Board invariant violated");
        }
        panic!("board invariants violated: {violations:?}");
    }
}
