//! The [`Lattice`] trait describing the abstract domain of a variable,
//! the canonical lattices shipped with the crate, and the type-erased
//! operation table used by [`Assignment`](super::Assignment) to work with
//! values of lattices it does not know about.

use itertools::Itertools;
use std::{
    any::{self, Any},
    collections::BTreeSet,
    fmt,
    marker::PhantomData,
};

/// A join-semilattice over `Value`.
///
/// Implementations are zero-sized marker types; all state lives in the
/// values themselves. The operations must satisfy the usual laws:
/// `meet_assign` is monotone in its source and returns whether the
/// destination strictly grew, `less` is a partial order, and
/// `less(bottom(), x)` holds for every `x`.
pub trait Lattice: 'static {
    /// The value type of this lattice.
    type Value: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Returns the least element of the lattice.
    fn bottom() -> Self::Value;

    /// Stores the least upper bound of `dst` and `src` in `dst`,
    /// and returns true if `dst` strictly grew.
    fn meet_assign(dst: &mut Self::Value, src: &Self::Value) -> bool;

    /// Returns true if `a` is less than or equal to `b` in the lattice order.
    fn less(a: &Self::Value, b: &Self::Value) -> bool;

    /// Renders a value for diagnostics. Defaults to the value's `Debug`
    /// output; lattices with their own notation override this.
    fn fmt_value(value: &Self::Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", value)
    }
}

/// The bounds required of powerset elements.
///
/// Blanket-implemented; users never implement this by hand.
pub trait Element: Ord + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T: Ord + Clone + fmt::Debug + Send + Sync + 'static> Element for T {}

/// The powerset of `E` with union as meet and inclusion as order.
///
/// Values are [`BTreeSet`]s so that rendering is deterministic.
pub struct SetLattice<E: Element> {
    _marker: PhantomData<E>,
}

impl<E: Element> Lattice for SetLattice<E> {
    type Value = BTreeSet<E>;

    fn bottom() -> Self::Value {
        BTreeSet::new()
    }

    fn meet_assign(dst: &mut Self::Value, src: &Self::Value) -> bool {
        let mut grew = false;
        for e in src {
            grew = dst.insert(e.clone()) || grew;
        }
        grew
    }

    fn less(a: &Self::Value, b: &Self::Value) -> bool {
        a.is_subset(b)
    }

    /// Sets render as `{5,6,7}`, comma-joined without spaces.
    fn fmt_value(value: &Self::Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            value.iter().map(|e| format!("{:?}", e)).join(",")
        )
    }
}

/// The product of two lattices with component-wise meet and order.
pub struct ProductLattice<A: Lattice, B: Lattice> {
    _marker: PhantomData<(fn() -> A, fn() -> B)>,
}

impl<A: Lattice, B: Lattice> Lattice for ProductLattice<A, B> {
    type Value = (A::Value, B::Value);

    fn bottom() -> Self::Value {
        (A::bottom(), B::bottom())
    }

    fn meet_assign(dst: &mut Self::Value, src: &Self::Value) -> bool {
        let first = A::meet_assign(&mut dst.0, &src.0);
        let second = B::meet_assign(&mut dst.1, &src.1);
        first || second
    }

    fn less(a: &Self::Value, b: &Self::Value) -> bool {
        A::less(&a.0, &b.0) && B::less(&a.1, &b.1)
    }
}

/// A type-erased lattice value as stored in an assignment slot.
pub(crate) type AnyValue = dyn Any + Send + Sync;

/// The operations of one lattice, usable without knowing its types.
///
/// One `'static` instance exists per lattice; value handles carry a
/// pointer to it so the engine can meet, compare, and render values it
/// cannot name. This is the lattice registry: the tag is the lattice's
/// [`TypeId`](std::any::TypeId), and the lookup is a pointer chase.
pub(crate) struct LatticeOps {
    /// Type name of the lattice, for error messages.
    pub(crate) lattice_name: fn() -> &'static str,
    pub(crate) bottom: fn() -> Box<AnyValue>,
    pub(crate) meet_assign: fn(&mut AnyValue, &AnyValue) -> bool,
    pub(crate) less: fn(&AnyValue, &AnyValue) -> bool,
    pub(crate) eq: fn(&AnyValue, &AnyValue) -> bool,
    pub(crate) is_bottom: fn(&AnyValue) -> bool,
    pub(crate) clone: fn(&AnyValue) -> Box<AnyValue>,
    pub(crate) fmt: fn(&AnyValue, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl LatticeOps {
    /// Returns the operation table of `L`.
    pub(crate) fn of<L: Lattice>() -> &'static LatticeOps {
        struct Vtable<L>(PhantomData<L>);

        impl<L: Lattice> Vtable<L> {
            const OPS: LatticeOps = LatticeOps {
                lattice_name: Self::lattice_name,
                bottom: Self::bottom,
                meet_assign: Self::meet_assign,
                less: Self::less,
                eq: Self::eq,
                is_bottom: Self::is_bottom,
                clone: Self::clone,
                fmt: Self::fmt,
            };

            fn lattice_name() -> &'static str {
                any::type_name::<L>()
            }

            fn downcast(value: &AnyValue) -> &L::Value {
                value
                    .downcast_ref::<L::Value>()
                    .expect("slot keyed by lattice tag holds the lattice's value type")
            }

            fn bottom() -> Box<AnyValue> {
                Box::new(L::bottom())
            }

            fn meet_assign(dst: &mut AnyValue, src: &AnyValue) -> bool {
                let src = Self::downcast(src).clone();
                let dst = dst
                    .downcast_mut::<L::Value>()
                    .expect("slot keyed by lattice tag holds the lattice's value type");
                L::meet_assign(dst, &src)
            }

            fn less(a: &AnyValue, b: &AnyValue) -> bool {
                L::less(Self::downcast(a), Self::downcast(b))
            }

            fn eq(a: &AnyValue, b: &AnyValue) -> bool {
                Self::downcast(a) == Self::downcast(b)
            }

            fn is_bottom(value: &AnyValue) -> bool {
                Self::downcast(value) == &L::bottom()
            }

            fn clone(value: &AnyValue) -> Box<AnyValue> {
                Box::new(Self::downcast(value).clone())
            }

            fn fmt(value: &AnyValue, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                L::fmt_value(Self::downcast(value), f)
            }
        }

        &Vtable::<L>::OPS
    }
}
