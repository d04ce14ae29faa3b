//! The lazily resolved Fibonacci system: an infinite family of constraints
//! of which a lazy solve only ever materializes the part below the seed.

use crate::constraints::{elem, subset_binary};
use crate::model::{Constraints, SetLattice, TypedValueId, ValueId};
use std::collections::BTreeSet;

/// The variable holding the `id`-th Fibonacci number.
pub fn var(id: u32) -> TypedValueId<SetLattice<i32>> {
    TypedValueId::new(id)
}

/// Resolves `v0` to `{0}`, `v1` and `v2` to `{1}`, and every later
/// variable to the pairwise sums of its two predecessors.
pub fn resolver(variables: &BTreeSet<ValueId>) -> Constraints {
    let mut result = Constraints::new();
    for v in variables {
        let id = v.id();
        if id == 0 {
            result.add(elem(0, var(id)));
        } else if id == 1 || id == 2 {
            result.add(elem(1, var(id)));
        } else {
            result.add(subset_binary(var(id - 1), var(id - 2), var(id), add_on_cross));
        }
    }
    result
}

fn add_on_cross(a: &BTreeSet<i32>, b: &BTreeSet<i32>) -> BTreeSet<i32> {
    let mut result = BTreeSet::new();
    for x in a {
        for y in b {
            result.insert(x + y);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve_lazy;

    #[test]
    fn small_seeds_resolve_to_small_values() {
        let result = solve_lazy(var(4), resolver).unwrap();
        let expected: BTreeSet<i32> = std::iter::once(3).collect();
        assert_eq!(result.peek(var(4)), Some(&expected));
    }
}
