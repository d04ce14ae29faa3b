//! The dependency graph from variables to the constraints that must be
//! re-evaluated when they grow.

use crate::model::ValueId;
use std::collections::HashMap;

/// Maps each variable to the constraints depending on it, by index into
/// the engine's constraint vector.
///
/// Edges are recorded in registration order; callers are responsible for
/// not registering the same edge twice.
#[derive(Clone, Debug, Default)]
pub(crate) struct DependencyGraph {
    dependents: HashMap<ValueId, Vec<usize>>,
}

impl DependencyGraph {
    /// Records that `constraint` must be re-evaluated when `variable` grows.
    pub(crate) fn add_dependent(&mut self, variable: ValueId, constraint: usize) {
        self.dependents.entry(variable).or_default().push(constraint);
    }

    /// Returns the constraints depending on `variable`, in registration order.
    pub(crate) fn dependents_of(&self, variable: ValueId) -> &[usize] {
        self.dependents
            .get(&variable)
            .map_or(&[], |dependents| dependents.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SetLattice, TypedValueId};

    fn v(id: u32) -> ValueId {
        TypedValueId::<SetLattice<i32>>::new(id).into()
    }

    #[test]
    fn unknown_variable_has_no_dependents() {
        let graph = DependencyGraph::default();
        assert!(graph.dependents_of(v(1)).is_empty());
    }

    #[test]
    fn dependents_are_kept_in_registration_order() {
        let mut graph = DependencyGraph::default();
        graph.add_dependent(v(1), 2);
        graph.add_dependent(v(1), 0);
        graph.add_dependent(v(2), 1);
        assert_eq!(graph.dependents_of(v(1)), &[2, 0]);
        assert_eq!(graph.dependents_of(v(2)), &[1]);
    }
}
