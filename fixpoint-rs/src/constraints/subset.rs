//! Subset constraints between variables, unconditional and guarded.
//!
//! The guarded forms only read their body input once the guard holds,
//! which is what makes their dependency sets assignment-dependent.

use crate::model::{
    Assignment, Constraint, ConstraintError, ConstraintPtr, Element, Lattice, SetLattice,
    TypedValueId, UpdateResult, ValueId,
};
use std::{fmt, sync::Arc};

/// Meets the value of `a` into `b`, reporting how `b` moved.
fn meet_from<L: Lattice>(
    assignment: &mut Assignment,
    a: TypedValueId<L>,
    b: TypedValueId<L>,
) -> UpdateResult {
    if a == b {
        return UpdateResult::Unchanged;
    }
    let src = match assignment.peek(a) {
        Some(src) => src.clone(),
        None => return UpdateResult::Unchanged,
    };
    assignment.meet_assign(b, &src).into()
}

/// Returns true if the value of `a` is below the value of `b`.
fn is_below<L: Lattice>(assignment: &Assignment, a: TypedValueId<L>, b: TypedValueId<L>) -> bool {
    let bottom = L::bottom();
    L::less(
        assignment.peek(a).unwrap_or(&bottom),
        assignment.peek(b).unwrap_or(&bottom),
    )
}

/// `A sub B`: the value of `A` is a lower bound of the value of `B`.
#[derive(derivative::Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Subset<L: Lattice> {
    a: TypedValueId<L>,
    b: TypedValueId<L>,
}

impl<L: Lattice> Subset<L> {
    /// Constructs a new `Subset` constraint.
    pub fn new(a: TypedValueId<L>, b: TypedValueId<L>) -> Self {
        Subset { a, b }
    }
}

impl<L: Lattice> Constraint for Subset<L> {
    fn inputs(&self) -> Vec<ValueId> {
        vec![self.a.into()]
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.b.into()]
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        Ok(meet_from(assignment, self.a, self.b))
    }

    fn check(&self, assignment: &Assignment) -> bool {
        is_below(assignment, self.a, self.b)
    }
}

impl<L: Lattice> fmt::Display for Subset<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sub {}", self.a, self.b)
    }
}

/// Creates a constraint ensuring that `a` is a subset of `b`.
pub fn subset<L: Lattice>(a: TypedValueId<L>, b: TypedValueId<L>) -> ConstraintPtr {
    Arc::new(Subset::new(a, b))
}

/// `e in S => A sub B`.
#[derive(derivative::Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct SubsetIfElem<E: Element, L: Lattice> {
    element: E,
    guard: TypedValueId<SetLattice<E>>,
    a: TypedValueId<L>,
    b: TypedValueId<L>,
}

impl<E: Element, L: Lattice> SubsetIfElem<E, L> {
    /// Constructs a new `SubsetIfElem` constraint.
    pub fn new(
        element: E,
        guard: TypedValueId<SetLattice<E>>,
        a: TypedValueId<L>,
        b: TypedValueId<L>,
    ) -> Self {
        SubsetIfElem {
            element,
            guard,
            a,
            b,
        }
    }

    fn guard_holds(&self, assignment: &Assignment) -> bool {
        assignment
            .peek(self.guard)
            .map_or(false, |s| s.contains(&self.element))
    }
}

impl<E: Element, L: Lattice> Constraint for SubsetIfElem<E, L> {
    fn inputs(&self) -> Vec<ValueId> {
        vec![self.guard.into(), self.a.into()]
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.b.into()]
    }

    fn has_dynamic_inputs(&self) -> bool {
        true
    }

    fn used_inputs(&self, assignment: &Assignment) -> Vec<ValueId> {
        if self.guard_holds(assignment) {
            vec![self.guard.into(), self.a.into()]
        } else {
            vec![self.guard.into()]
        }
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        if self.guard_holds(assignment) {
            Ok(meet_from(assignment, self.a, self.b))
        } else {
            Ok(UpdateResult::Unchanged)
        }
    }

    fn check(&self, assignment: &Assignment) -> bool {
        !self.guard_holds(assignment) || is_below(assignment, self.a, self.b)
    }
}

impl<E: Element, L: Lattice> fmt::Display for SubsetIfElem<E, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} in {} => {} sub {}",
            self.element, self.guard, self.a, self.b
        )
    }
}

/// Creates a constraint ensuring that `a` is a subset of `b` once
/// `element` is in `guard`.
pub fn subset_if_elem<E: Element, L: Lattice>(
    element: E,
    guard: TypedValueId<SetLattice<E>>,
    a: TypedValueId<L>,
    b: TypedValueId<L>,
) -> ConstraintPtr {
    Arc::new(SubsetIfElem::new(element, guard, a, b))
}

/// `|S| > n => A sub B`.
///
/// The threshold is kept signed and compared after a cast to `u64`, so a
/// negative threshold never fires the guard.
#[derive(derivative::Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct SubsetIfBigger<E: Element, L: Lattice> {
    set: TypedValueId<SetLattice<E>>,
    threshold: i64,
    a: TypedValueId<L>,
    b: TypedValueId<L>,
}

impl<E: Element, L: Lattice> SubsetIfBigger<E, L> {
    /// Constructs a new `SubsetIfBigger` constraint.
    pub fn new(
        set: TypedValueId<SetLattice<E>>,
        threshold: i64,
        a: TypedValueId<L>,
        b: TypedValueId<L>,
    ) -> Self {
        SubsetIfBigger {
            set,
            threshold,
            a,
            b,
        }
    }

    fn guard_holds(&self, assignment: &Assignment) -> bool {
        let len = assignment.peek(self.set).map_or(0, |s| s.len());
        (len as u64) > (self.threshold as u64)
    }
}

impl<E: Element, L: Lattice> Constraint for SubsetIfBigger<E, L> {
    fn inputs(&self) -> Vec<ValueId> {
        vec![self.set.into(), self.a.into()]
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.b.into()]
    }

    fn has_dynamic_inputs(&self) -> bool {
        true
    }

    fn used_inputs(&self, assignment: &Assignment) -> Vec<ValueId> {
        if self.guard_holds(assignment) {
            vec![self.set.into(), self.a.into()]
        } else {
            vec![self.set.into()]
        }
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        if self.guard_holds(assignment) {
            Ok(meet_from(assignment, self.a, self.b))
        } else {
            Ok(UpdateResult::Unchanged)
        }
    }

    fn check(&self, assignment: &Assignment) -> bool {
        !self.guard_holds(assignment) || is_below(assignment, self.a, self.b)
    }
}

impl<E: Element, L: Lattice> fmt::Display for SubsetIfBigger<E, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|{}| > {} => {} sub {}",
            self.set, self.threshold, self.a, self.b
        )
    }
}

/// Creates a constraint ensuring that `a` is a subset of `b` once `set`
/// has more than `threshold` elements.
pub fn subset_if_bigger<E: Element, L: Lattice>(
    set: TypedValueId<SetLattice<E>>,
    threshold: i64,
    a: TypedValueId<L>,
    b: TypedValueId<L>,
) -> ConstraintPtr {
    Arc::new(SubsetIfBigger::new(set, threshold, a, b))
}

/// `|S - {t}| > n => A sub B`.
#[derive(derivative::Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct SubsetIfReducedBigger<E: Element, L: Lattice> {
    set: TypedValueId<SetLattice<E>>,
    removed: E,
    threshold: i64,
    a: TypedValueId<L>,
    b: TypedValueId<L>,
}

impl<E: Element, L: Lattice> SubsetIfReducedBigger<E, L> {
    /// Constructs a new `SubsetIfReducedBigger` constraint.
    pub fn new(
        set: TypedValueId<SetLattice<E>>,
        removed: E,
        threshold: i64,
        a: TypedValueId<L>,
        b: TypedValueId<L>,
    ) -> Self {
        SubsetIfReducedBigger {
            set,
            removed,
            threshold,
            a,
            b,
        }
    }

    fn guard_holds(&self, assignment: &Assignment) -> bool {
        let len = assignment
            .peek(self.set)
            .map_or(0, |s| s.len() - s.contains(&self.removed) as usize);
        (len as u64) > (self.threshold as u64)
    }
}

impl<E: Element, L: Lattice> Constraint for SubsetIfReducedBigger<E, L> {
    fn inputs(&self) -> Vec<ValueId> {
        vec![self.set.into(), self.a.into()]
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.b.into()]
    }

    fn has_dynamic_inputs(&self) -> bool {
        true
    }

    fn used_inputs(&self, assignment: &Assignment) -> Vec<ValueId> {
        if self.guard_holds(assignment) {
            vec![self.set.into(), self.a.into()]
        } else {
            vec![self.set.into()]
        }
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        if self.guard_holds(assignment) {
            Ok(meet_from(assignment, self.a, self.b))
        } else {
            Ok(UpdateResult::Unchanged)
        }
    }

    fn check(&self, assignment: &Assignment) -> bool {
        !self.guard_holds(assignment) || is_below(assignment, self.a, self.b)
    }
}

impl<E: Element, L: Lattice> fmt::Display for SubsetIfReducedBigger<E, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|{} - {{{:?}}}| > {} => {} sub {}",
            self.set, self.removed, self.threshold, self.a, self.b
        )
    }
}

/// Creates a constraint ensuring that `a` is a subset of `b` once `set`
/// without `removed` has more than `threshold` elements.
pub fn subset_if_reduced_bigger<E: Element, L: Lattice>(
    set: TypedValueId<SetLattice<E>>,
    removed: E,
    threshold: i64,
    a: TypedValueId<L>,
    b: TypedValueId<L>,
) -> ConstraintPtr {
    Arc::new(SubsetIfReducedBigger::new(set, removed, threshold, a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::elem;
    use std::collections::BTreeSet;

    fn s(id: u32) -> TypedValueId<SetLattice<i32>> {
        TypedValueId::new(id)
    }

    fn set(elements: &[i32]) -> BTreeSet<i32> {
        elements.iter().copied().collect()
    }

    #[test]
    fn renders_like_the_problem_notation() {
        assert_eq!(subset(s(1), s(2)).to_string(), "v1 sub v2");
        assert_eq!(
            subset_if_elem(5, s(1), s(2), s(3)).to_string(),
            "5 in v1 => v2 sub v3"
        );
        assert_eq!(
            subset_if_bigger(s(1), 5, s(2), s(3)).to_string(),
            "|v1| > 5 => v2 sub v3"
        );
        assert_eq!(
            subset_if_reduced_bigger(s(1), 3, 2, s(2), s(3)).to_string(),
            "|v1 - {3}| > 2 => v2 sub v3"
        );
    }

    #[test]
    fn guarded_inputs_depend_on_the_assignment() {
        let constraint = subset_if_elem(0, s(1), s(2), s(3));
        assert!(constraint.has_dynamic_inputs());
        assert_eq!(constraint.inputs(), vec![s(1).into(), s(2).into()]);
        assert_eq!(constraint.outputs(), vec![s(3).into()]);

        let mut assignment = Assignment::new();
        assert_eq!(constraint.used_inputs(&assignment), vec![s(1).into()]);

        assignment.get_mut(s(1)).insert(0);
        assert_eq!(
            constraint.used_inputs(&assignment),
            vec![s(1).into(), s(2).into()]
        );
    }

    #[test]
    fn check_and_used_inputs_matrix() {
        let s1 = s(1);
        let s2 = s(2);

        let mut a = Assignment::new();
        a.set(s1, set(&[1, 2]));
        a.set(s2, set(&[1, 2, 3]));

        let c = subset(s1, s2);
        assert!(c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 1);

        let c = subset(s2, s1);
        assert!(!c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 1);

        let c = elem(3, s1);
        assert!(!c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 0);

        let c = elem(3, s2);
        assert!(c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 0);

        let c = subset_if_elem(3, s2, s1, s2);
        assert!(c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 2);

        let c = subset_if_elem(3, s2, s2, s1);
        assert!(!c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 2);

        let c = subset_if_elem(3, s1, s1, s2);
        assert!(c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 1);

        let c = subset_if_elem(3, s1, s2, s1);
        assert!(c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 1);

        let c = subset_if_bigger(s1, 1, s1, s2);
        assert!(c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 2);

        let c = subset_if_bigger(s1, 5, s1, s2);
        assert!(c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 1);

        let c = subset_if_bigger(s1, 1, s2, s1);
        assert!(!c.check(&a));
        assert_eq!(c.used_inputs(&a).len(), 2);
    }

    #[test]
    fn size_guard_boundaries() {
        let mut a = Assignment::new();
        a.set(s(1), set(&[1, 2, 3]));

        // n = size - 1 fires the guard, n = size does not.
        let c = SubsetIfBigger::<i32, SetLattice<i32>>::new(s(1), 2, s(2), s(3));
        assert!(c.guard_holds(&a));
        let c = SubsetIfBigger::<i32, SetLattice<i32>>::new(s(1), 3, s(2), s(3));
        assert!(!c.guard_holds(&a));

        // A negative threshold casts to a huge unsigned value and can
        // never fire.
        let c = SubsetIfBigger::<i32, SetLattice<i32>>::new(s(1), -1, s(2), s(3));
        assert!(!c.guard_holds(&a));
    }

    #[test]
    fn reduced_size_guard_discounts_the_removed_element() {
        let mut a = Assignment::new();
        a.set(s(1), set(&[1, 2, 3]));

        // |{1,2,3} - {3}| = 2
        let c = SubsetIfReducedBigger::<i32, SetLattice<i32>>::new(s(1), 3, 1, s(2), s(3));
        assert!(c.guard_holds(&a));
        let c = SubsetIfReducedBigger::<i32, SetLattice<i32>>::new(s(1), 3, 2, s(2), s(3));
        assert!(!c.guard_holds(&a));

        // Removing an element that is not there changes nothing.
        let c = SubsetIfReducedBigger::<i32, SetLattice<i32>>::new(s(1), 9, 2, s(2), s(3));
        assert!(c.guard_holds(&a));
    }

    #[test]
    fn subset_of_itself_is_a_fixed_point() {
        let c = subset(s(1), s(1));
        let mut a = Assignment::new();
        a.set(s(1), set(&[1]));
        assert_eq!(c.update(&mut a), Ok(UpdateResult::Unchanged));
        assert!(c.check(&a));
    }
}
