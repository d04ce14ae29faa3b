//! An implementation of a worklist-based monotone constraint solver over
//! user-defined lattices.
//!
//! Problems are systems of constraints over typed value variables, each
//! variable drawing its values from a [`Lattice`](model::Lattice). The
//! solver advances an [`Assignment`](model::Assignment) monotonically until
//! every constraint is satisfied, reaching the least fixed point. Two modes
//! are supported:
//!
//! * **Eager**: [`solver::solve`] takes a complete
//!   [`Constraints`](model::Constraints) collection.
//! * **Lazy**: [`solver::solve_lazy`] takes a seed variable and a
//!   [`Resolver`](solver::Resolver) producing constraints on demand, and
//!   only materializes the part of the system the seed depends on.
//!
//! Constraints may have *assignment-dependent dependencies*: the set of
//! variables they read can grow as the assignment grows, and the engine
//! re-registers triggers after every update to keep up.
//!
//! # Examples
//!
//! ```rust
//! use fixpoint_rs::constraints::{elem, subset};
//! use fixpoint_rs::model::{Constraints, SetLattice, TypedValueId};
//! use fixpoint_rs::solver::solve;
//!
//! let a = TypedValueId::<SetLattice<i32>>::new(1);
//! let b = TypedValueId::<SetLattice<i32>>::new(2);
//!
//! let problem: Constraints = vec![elem(5, a), subset(a, b)].into();
//! let result = solve(&problem).unwrap();
//!
//! assert!(result.peek(b).unwrap().contains(&5));
//! assert!(problem.check_all(&result));
//! ```

pub mod constraints;
pub mod examples;
pub mod model;
pub mod solver;

pub use model::{
    Assignment, Constraint, ConstraintPtr, Constraints, Lattice, SetLattice, SolveError,
    TypedValueId, ValueId,
};
pub use solver::{solve, solve_lazy, Resolver};
