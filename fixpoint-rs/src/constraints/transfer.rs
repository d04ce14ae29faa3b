//! Transfer constraints: a user function applied to input values, with the
//! result met into the output.

use crate::model::{
    Assignment, Constraint, ConstraintError, ConstraintPtr, Lattice, TypedValueId, UpdateResult,
    ValueId,
};
use std::{fmt, sync::Arc};

/// `f(A) sub B`: the image of `A` under `f` is a lower bound of `B`.
#[derive(derivative::Derivative)]
#[derivative(Debug(bound = ""))]
pub struct SubsetUnary<A: Lattice, B: Lattice, F> {
    a: TypedValueId<A>,
    b: TypedValueId<B>,
    #[derivative(Debug = "ignore")]
    f: F,
}

impl<A, B, F> SubsetUnary<A, B, F>
where
    A: Lattice,
    B: Lattice,
    F: Fn(&A::Value) -> B::Value,
{
    /// Constructs a new `SubsetUnary` constraint.
    pub fn new(a: TypedValueId<A>, b: TypedValueId<B>, f: F) -> Self {
        SubsetUnary { a, b, f }
    }

    fn mapped(&self, assignment: &Assignment) -> B::Value {
        let bottom = A::bottom();
        (self.f)(assignment.peek(self.a).unwrap_or(&bottom))
    }
}

impl<A, B, F> Constraint for SubsetUnary<A, B, F>
where
    A: Lattice,
    B: Lattice,
    F: Fn(&A::Value) -> B::Value + Send + Sync + 'static,
{
    fn inputs(&self) -> Vec<ValueId> {
        vec![self.a.into()]
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.b.into()]
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        let mapped = self.mapped(assignment);
        Ok(assignment.meet_assign(self.b, &mapped).into())
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let bottom = B::bottom();
        B::less(
            &self.mapped(assignment),
            assignment.peek(self.b).unwrap_or(&bottom),
        )
    }
}

impl<A: Lattice, B: Lattice, F> fmt::Display for SubsetUnary<A, B, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f({}) sub {}", self.a, self.b)
    }
}

/// Creates a constraint ensuring that `f` applied to the value of `a` is
/// a lower bound of `b`.
pub fn subset_unary<A, B, F>(a: TypedValueId<A>, b: TypedValueId<B>, f: F) -> ConstraintPtr
where
    A: Lattice,
    B: Lattice,
    F: Fn(&A::Value) -> B::Value + Send + Sync + 'static,
{
    Arc::new(SubsetUnary::new(a, b, f))
}

/// `f(A, B) sub C`: the image of `A` and `B` under `f` is a lower bound
/// of `C`.
#[derive(derivative::Derivative)]
#[derivative(Debug(bound = ""))]
pub struct SubsetBinary<A: Lattice, B: Lattice, C: Lattice, F> {
    a: TypedValueId<A>,
    b: TypedValueId<B>,
    c: TypedValueId<C>,
    #[derivative(Debug = "ignore")]
    f: F,
}

impl<A, B, C, F> SubsetBinary<A, B, C, F>
where
    A: Lattice,
    B: Lattice,
    C: Lattice,
    F: Fn(&A::Value, &B::Value) -> C::Value,
{
    /// Constructs a new `SubsetBinary` constraint.
    pub fn new(a: TypedValueId<A>, b: TypedValueId<B>, c: TypedValueId<C>, f: F) -> Self {
        SubsetBinary { a, b, c, f }
    }

    fn mapped(&self, assignment: &Assignment) -> C::Value {
        let bottom_a = A::bottom();
        let bottom_b = B::bottom();
        (self.f)(
            assignment.peek(self.a).unwrap_or(&bottom_a),
            assignment.peek(self.b).unwrap_or(&bottom_b),
        )
    }
}

impl<A, B, C, F> Constraint for SubsetBinary<A, B, C, F>
where
    A: Lattice,
    B: Lattice,
    C: Lattice,
    F: Fn(&A::Value, &B::Value) -> C::Value + Send + Sync + 'static,
{
    fn inputs(&self) -> Vec<ValueId> {
        vec![self.a.into(), self.b.into()]
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.c.into()]
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        let mapped = self.mapped(assignment);
        Ok(assignment.meet_assign(self.c, &mapped).into())
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let bottom = C::bottom();
        C::less(
            &self.mapped(assignment),
            assignment.peek(self.c).unwrap_or(&bottom),
        )
    }
}

impl<A: Lattice, B: Lattice, C: Lattice, F> fmt::Display for SubsetBinary<A, B, C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f({}, {}) sub {}", self.a, self.b, self.c)
    }
}

/// Creates a constraint ensuring that `f` applied to the values of `a`
/// and `b` is a lower bound of `c`.
pub fn subset_binary<A, B, C, F>(
    a: TypedValueId<A>,
    b: TypedValueId<B>,
    c: TypedValueId<C>,
    f: F,
) -> ConstraintPtr
where
    A: Lattice,
    B: Lattice,
    C: Lattice,
    F: Fn(&A::Value, &B::Value) -> C::Value + Send + Sync + 'static,
{
    Arc::new(SubsetBinary::new(a, b, c, f))
}
