//! Functions for creating scalable subset-chain problems.

use crate::constraints::{elem, subset};
use crate::model::{Constraints, SetLattice, TypedValueId};

/// The variable with the given id, as used by the generators in this module.
pub fn var(id: u32) -> TypedValueId<SetLattice<i32>> {
    TypedValueId::new(id)
}

/// Constructs a problem with one long chain of subset constraints:
/// an element flows from `v0` through every variable up to
/// `v(n_variables - 1)`.
pub fn linear_oneway(n_variables: u32) -> Constraints {
    let mut constraints = Constraints::new();
    constraints.add(elem(0, var(0)));
    for id in 1..n_variables {
        constraints.add(subset(var(id - 1), var(id)));
    }
    constraints
}

/// Constructs a problem where `v0` flows into every other variable
/// directly.
pub fn fan_out(n_variables: u32) -> Constraints {
    let mut constraints = Constraints::new();
    constraints.add(elem(0, var(0)));
    constraints.add(elem(1, var(0)));
    for id in 1..n_variables {
        constraints.add(subset(var(0), var(id)));
    }
    constraints
}

/// Constructs a diamond-shaped problem: `v0` fans out into
/// `n_variables - 2` middle variables that all rejoin in the last one.
/// Needs at least 3 variables.
pub fn diamond(n_variables: u32) -> Constraints {
    let last = n_variables - 1;
    let mut constraints = Constraints::new();
    constraints.add(elem(0, var(0)));
    constraints.add(elem(1, var(0)));
    for id in 1..last {
        constraints.add(subset(var(0), var(id)));
        constraints.add(subset(var(id), var(last)));
    }
    constraints
}
