//! The [`Constraint`] protocol: the contract between the solver engine and
//! anything that can advance an [`Assignment`], plus the [`Constraints`]
//! collection problems are assembled in.
//!
//! The canned shapes in [`crate::constraints`] implement this trait; custom
//! constraints implement it the same way.

use super::{
    assignment::{Assignment, Change},
    errors::TypeMismatch,
    value_id::ValueId,
};
use itertools::Itertools;
use std::{fmt, iter::FromIterator, sync::Arc};

/// How an update moved a constraint's outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateResult {
    /// No output moved.
    Unchanged,
    /// At least one output strictly grew; none shrank.
    Incremented,
    /// An output was rewritten non-monotonically.
    ///
    /// The engine propagates this like [`Incremented`](UpdateResult::Incremented)
    /// but must never treat the outputs as final.
    Altered,
}

impl UpdateResult {
    /// Returns true unless the result is [`Unchanged`](UpdateResult::Unchanged).
    pub fn changed(self) -> bool {
        self != UpdateResult::Unchanged
    }
}

impl From<Change> for UpdateResult {
    fn from(change: Change) -> Self {
        match change {
            Change::Unchanged => UpdateResult::Unchanged,
            Change::Grew => UpdateResult::Incremented,
        }
    }
}

/// The potential failures of a constraint update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintError {
    /// A value handle was used with the wrong lattice.
    TypeMismatch(TypeMismatch),
    /// A custom error from the programmer.
    Custom(String),
}

impl fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintError::TypeMismatch(tm) => tm.fmt(f),
            ConstraintError::Custom(msg) => msg.fmt(f),
        }
    }
}

impl From<TypeMismatch> for ConstraintError {
    fn from(tm: TypeMismatch) -> Self {
        Self::TypeMismatch(tm)
    }
}

/// A relation between variables that the solver can enforce.
///
/// Implementations must be side-effect free apart from writes to the
/// assignment handed to [`update`](Constraint::update), and must not retain
/// references to it across calls. `Display` is the diagnostic rendering
/// used in logs, errors and dot output.
pub trait Constraint: fmt::Debug + fmt::Display + Send + Sync {
    /// The variables whose current values may influence the outputs.
    fn inputs(&self) -> Vec<ValueId>;

    /// The variables this constraint may write to.
    fn outputs(&self) -> Vec<ValueId>;

    /// Whether [`used_inputs`](Constraint::used_inputs) may return variables
    /// beyond [`inputs`](Constraint::inputs) as the assignment grows.
    fn has_dynamic_inputs(&self) -> bool {
        false
    }

    /// The variables this constraint would actually read under the given
    /// assignment. Guarded constraints return only the guard variable while
    /// the guard is false.
    fn used_inputs(&self, _assignment: &Assignment) -> Vec<ValueId> {
        self.inputs()
    }

    /// Whether the outputs should also be registered as triggers for this
    /// constraint. Plain emissions and rewrites have no feedback loop
    /// through their outputs; aggregating constraints may opt in.
    fn triggers_on_outputs(&self) -> bool {
        false
    }

    /// Monotonically advances the outputs under the given assignment.
    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError>;

    /// Returns true if the outputs already satisfy this constraint.
    fn check(&self, assignment: &Assignment) -> bool;
}

/// A shared handle to a constraint.
pub type ConstraintPtr = Arc<dyn Constraint>;

/// A collection of constraints forming one problem.
#[derive(Clone, Debug, Default)]
pub struct Constraints {
    constraints: Vec<ConstraintPtr>,
}

impl Constraints {
    /// Constructs an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint.
    pub fn add(&mut self, constraint: ConstraintPtr) {
        self.constraints.push(constraint);
    }

    /// Returns the number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns true if there are no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterates over the constraints in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintPtr> {
        self.constraints.iter()
    }

    /// Returns true if every constraint's `check` passes under `assignment`.
    pub fn check_all(&self, assignment: &Assignment) -> bool {
        self.constraints.iter().all(|c| c.check(assignment))
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.constraints.iter().join(","))
    }
}

impl From<Vec<ConstraintPtr>> for Constraints {
    fn from(constraints: Vec<ConstraintPtr>) -> Self {
        Constraints { constraints }
    }
}

impl FromIterator<ConstraintPtr> for Constraints {
    fn from_iter<I: IntoIterator<Item = ConstraintPtr>>(iter: I) -> Self {
        Constraints {
            constraints: iter.into_iter().collect(),
        }
    }
}

impl Extend<ConstraintPtr> for Constraints {
    fn extend<I: IntoIterator<Item = ConstraintPtr>>(&mut self, iter: I) {
        self.constraints.extend(iter);
    }
}

impl IntoIterator for Constraints {
    type Item = ConstraintPtr;
    type IntoIter = std::vec::IntoIter<ConstraintPtr>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.into_iter()
    }
}

impl<'a> IntoIterator for &'a Constraints {
    type Item = &'a ConstraintPtr;
    type IntoIter = std::slice::Iter<'a, ConstraintPtr>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{elem, subset, subset_if_bigger, subset_if_elem};
    use crate::model::{lattice::SetLattice, value_id::TypedValueId};

    fn s(id: u32) -> TypedValueId<SetLattice<i32>> {
        TypedValueId::new(id)
    }

    #[test]
    fn update_result_from_change() {
        assert_eq!(UpdateResult::from(Change::Unchanged), UpdateResult::Unchanged);
        assert_eq!(UpdateResult::from(Change::Grew), UpdateResult::Incremented);
        assert!(!UpdateResult::Unchanged.changed());
        assert!(UpdateResult::Incremented.changed());
        assert!(UpdateResult::Altered.changed());
    }

    #[test]
    fn constraints_render_like_their_parts() {
        let problem: Constraints = vec![
            elem(3, s(1)),
            subset(s(1), s(2)),
            subset_if_elem(5, s(1), s(2), s(3)),
            subset_if_bigger(s(1), 5, s(2), s(3)),
        ]
        .into();

        assert_eq!(
            problem.to_string(),
            "{3 in v1,v1 sub v2,5 in v1 => v2 sub v3,|v1| > 5 => v2 sub v3}"
        );
    }

    #[test]
    fn empty_collection_checks_trivially() {
        let problem = Constraints::new();
        assert!(problem.is_empty());
        assert!(problem.check_all(&Assignment::new()));
    }
}
