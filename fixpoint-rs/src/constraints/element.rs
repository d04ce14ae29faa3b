//! Membership constraints: unconditional and guarded emission of a value
//! into a variable.

use crate::model::{
    Assignment, Constraint, ConstraintError, ConstraintPtr, Element, Lattice, SetLattice,
    TypedValueId, UpdateResult, ValueId,
};
use std::{collections::BTreeSet, fmt, sync::Arc};

/// `e in S`: the element `e` is in the set variable `S`.
#[derive(Clone, Debug)]
pub struct Elem<E: Element> {
    element: E,
    /// `{element}`, kept around so updates can meet without rebuilding it.
    value: BTreeSet<E>,
    set: TypedValueId<SetLattice<E>>,
}

impl<E: Element> Elem<E> {
    /// Constructs a new `Elem` constraint.
    pub fn new(element: E, set: TypedValueId<SetLattice<E>>) -> Self {
        let value = std::iter::once(element.clone()).collect();
        Elem {
            element,
            value,
            set,
        }
    }
}

impl<E: Element> Constraint for Elem<E> {
    fn inputs(&self) -> Vec<ValueId> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.set.into()]
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        Ok(assignment.meet_assign(self.set, &self.value).into())
    }

    fn check(&self, assignment: &Assignment) -> bool {
        assignment
            .peek(self.set)
            .map_or(false, |s| s.contains(&self.element))
    }
}

impl<E: Element> fmt::Display for Elem<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} in {}", self.element, self.set)
    }
}

/// Creates a constraint ensuring that `element` is in the set `set`.
pub fn elem<E: Element>(element: E, set: TypedValueId<SetLattice<E>>) -> ConstraintPtr {
    Arc::new(Elem::new(element, set))
}

/// `e in S => t in M`: if the guard element is in `S`, the item `t` is in `M`.
#[derive(Clone, Debug)]
pub struct ElemIf<E: Element, T: Element> {
    element: E,
    guard: TypedValueId<SetLattice<E>>,
    item: T,
    value: BTreeSet<T>,
    target: TypedValueId<SetLattice<T>>,
}

impl<E: Element, T: Element> ElemIf<E, T> {
    /// Constructs a new `ElemIf` constraint.
    pub fn new(
        element: E,
        guard: TypedValueId<SetLattice<E>>,
        item: T,
        target: TypedValueId<SetLattice<T>>,
    ) -> Self {
        let value = std::iter::once(item.clone()).collect();
        ElemIf {
            element,
            guard,
            item,
            value,
            target,
        }
    }

    fn guard_holds(&self, assignment: &Assignment) -> bool {
        assignment
            .peek(self.guard)
            .map_or(false, |s| s.contains(&self.element))
    }
}

impl<E: Element, T: Element> Constraint for ElemIf<E, T> {
    fn inputs(&self) -> Vec<ValueId> {
        vec![self.guard.into()]
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.target.into()]
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        if self.guard_holds(assignment) {
            Ok(assignment.meet_assign(self.target, &self.value).into())
        } else {
            Ok(UpdateResult::Unchanged)
        }
    }

    fn check(&self, assignment: &Assignment) -> bool {
        !self.guard_holds(assignment)
            || assignment
                .peek(self.target)
                .map_or(false, |s| s.contains(&self.item))
    }
}

impl<E: Element, T: Element> fmt::Display for ElemIf<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} in {} => {:?} in {}",
            self.element, self.guard, self.item, self.target
        )
    }
}

/// Creates a constraint inserting `item` into `target` once `element` is
/// in `guard`.
pub fn elem_if<E: Element, T: Element>(
    element: E,
    guard: TypedValueId<SetLattice<E>>,
    item: T,
    target: TypedValueId<SetLattice<T>>,
) -> ConstraintPtr {
    Arc::new(ElemIf::new(element, guard, item, target))
}

/// `c sub B`: the constant `c` is a lower bound of the variable `B`.
///
/// This is `elem` generalized to arbitrary lattices; it is what seeds
/// non-powerset problems.
#[derive(derivative::Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Constant<L: Lattice> {
    value: L::Value,
    out: TypedValueId<L>,
}

impl<L: Lattice> Constant<L> {
    /// Constructs a new `Constant` constraint.
    pub fn new(value: L::Value, out: TypedValueId<L>) -> Self {
        Constant { value, out }
    }
}

impl<L: Lattice> Constraint for Constant<L> {
    fn inputs(&self) -> Vec<ValueId> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.out.into()]
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        Ok(assignment.meet_assign(self.out, &self.value).into())
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let bottom = L::bottom();
        L::less(&self.value, assignment.peek(self.out).unwrap_or(&bottom))
    }
}

impl<L: Lattice> fmt::Display for Constant<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        L::fmt_value(&self.value, f)?;
        write!(f, " sub {}", self.out)
    }
}

/// Creates a constraint ensuring that `value` is a lower bound of `out`.
pub fn constant<L: Lattice>(value: L::Value, out: TypedValueId<L>) -> ConstraintPtr {
    Arc::new(Constant::new(value, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(id: u32) -> TypedValueId<SetLattice<i32>> {
        TypedValueId::new(id)
    }

    #[test]
    fn elem_renders_and_updates() {
        let c = Elem::new(3, s(1));
        assert_eq!(c.to_string(), "3 in v1");

        let mut a = Assignment::new();
        assert!(!c.check(&a));
        assert_eq!(c.update(&mut a), Ok(UpdateResult::Incremented));
        assert!(c.check(&a));
        assert_eq!(c.update(&mut a), Ok(UpdateResult::Unchanged));
    }

    #[test]
    fn elem_has_no_inputs() {
        let c = Elem::new(3, s(1));
        assert!(c.inputs().is_empty());
        assert_eq!(c.outputs(), vec![s(1).into()]);
        assert!(c.used_inputs(&Assignment::new()).is_empty());
    }

    #[test]
    fn elem_if_waits_for_its_guard() {
        let c = ElemIf::new(2, s(1), 7, s(2));
        assert_eq!(c.to_string(), "2 in v1 => 7 in v2");

        let mut a = Assignment::new();
        // Guard not satisfied: nothing happens, check passes vacuously.
        assert_eq!(c.update(&mut a), Ok(UpdateResult::Unchanged));
        assert!(c.check(&a));

        a.get_mut(s(1)).insert(2);
        assert!(!c.check(&a));
        assert_eq!(c.update(&mut a), Ok(UpdateResult::Incremented));
        assert!(c.check(&a));
        assert!(a.peek(s(2)).unwrap().contains(&7));
    }

    #[test]
    fn constant_meets_into_its_output() {
        let v: TypedValueId<SetLattice<i32>> = s(1);
        let value: std::collections::BTreeSet<i32> = vec![1, 2].into_iter().collect();
        let c = Constant::<SetLattice<i32>>::new(value.clone(), v);
        assert_eq!(c.to_string(), "{1,2} sub v1");

        let mut a = Assignment::new();
        assert_eq!(c.update(&mut a), Ok(UpdateResult::Incremented));
        assert_eq!(a.peek(v), Some(&value));
        assert!(c.check(&a));
    }
}
