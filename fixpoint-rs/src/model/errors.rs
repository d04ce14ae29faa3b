//! Errors surfaced by the solver API.

use super::{assignment::Assignment, value_id::ValueId};
use std::fmt::Display;

/// A value handle was used with a lattice it does not belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeMismatch {
    /// The offending handle.
    pub value: ValueId,
    /// The lattice the caller asked for.
    pub expected: &'static str,
    /// The lattice the handle actually belongs to.
    pub found: &'static str,
}

impl Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Value {} belongs to lattice {}, not {}",
            self.value, self.found, self.expected
        )
    }
}

/// Two constraints declared the same id under different lattices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatticeConflict {
    /// The contested integer id.
    pub id: u32,
    /// The lattice of the first declaration.
    pub first: &'static str,
    /// The lattice of the later, conflicting declaration.
    pub second: &'static str,
}

impl Display for LatticeConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Conflicting lattices declared for v{}: {} and {}",
            self.id, self.first, self.second
        )
    }
}

/// An error reported by a lazy [`Resolver`](crate::solver::Resolver).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolverError {
    /// The resolver withdrew a constraint it returned earlier.
    Contradiction {
        /// The variable whose constraints were withdrawn.
        variable: ValueId,
    },
}

impl Display for ResolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverError::Contradiction { variable } => {
                write!(f, "Resolver contradicted itself on {}", variable)
            }
        }
    }
}

/// An error occured while solving.
#[derive(Debug, PartialEq)]
pub enum SolveError {
    /// See [`TypeMismatch`].
    TypeMismatch(TypeMismatch),
    /// A constraint failed while updating the assignment.
    ConstraintUpdate {
        /// Rendering of the failing constraint.
        constraint: String,
        /// The failure it reported.
        cause: String,
    },
    /// See [`LatticeConflict`].
    LatticeConflict(LatticeConflict),
    /// The lazy resolver contradicted an earlier answer.
    ResolverContradiction {
        /// The variable whose constraints were withdrawn.
        variable: ValueId,
    },
    /// The cooperative cancel flag was observed between updates.
    ///
    /// Carries the assignment as it stood, with all monotone progress
    /// made so far; it is always safe to read.
    Cancelled(Box<Assignment>),
}

impl Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::TypeMismatch(tm) => tm.fmt(f),
            SolveError::ConstraintUpdate { constraint, cause } => {
                write!(f, "Constraint {} failed to update: {}", constraint, cause)
            }
            SolveError::LatticeConflict(lc) => lc.fmt(f),
            SolveError::ResolverContradiction { variable } => {
                write!(f, "Resolver contradicted itself on {}", variable)
            }
            SolveError::Cancelled(_) => write!(f, "Solve was cancelled"),
        }
    }
}

impl From<TypeMismatch> for SolveError {
    fn from(tm: TypeMismatch) -> Self {
        Self::TypeMismatch(tm)
    }
}

impl From<LatticeConflict> for SolveError {
    fn from(lc: LatticeConflict) -> Self {
        Self::LatticeConflict(lc)
    }
}

impl From<ResolverError> for SolveError {
    fn from(re: ResolverError) -> Self {
        match re {
            ResolverError::Contradiction { variable } => Self::ResolverContradiction { variable },
        }
    }
}
