//! Data types used for representing constraint problems, with the most
//! important ones being the following:
//!
//! 1. [`TypedValueId`] and [`ValueId`], handles identifying variables
//! 2. [`Lattice`], the abstract domain of a variable
//! 3. [`Assignment`], the mapping from handles to lattice values
//! 4. [`Constraint`] and [`Constraints`], the problem description
//!
//! As well as the error types of the API.

mod assignment;
mod constraint;
mod errors;
pub(crate) mod lattice;
mod value_id;

pub use assignment::{Assignment, Change};
pub use constraint::{Constraint, ConstraintError, ConstraintPtr, Constraints, UpdateResult};
pub use errors::{LatticeConflict, ResolverError, SolveError, TypeMismatch};
pub use lattice::{Element, Lattice, ProductLattice, SetLattice};
pub use value_id::{TypedValueId, ValueId};
