//! Canned constraint shapes covering the common patterns of monotone
//! analyses, so that problems can be written without re-implementing the
//! [`Constraint`](crate::model::Constraint) protocol.
//!
//! Each shape comes as a concrete struct plus a builder function returning
//! a [`ConstraintPtr`](crate::model::ConstraintPtr).

mod element;
mod subset;
mod transfer;

pub use element::{constant, elem, elem_if, Constant, Elem, ElemIf};
pub use subset::{
    subset, subset_if_bigger, subset_if_elem, subset_if_reduced_bigger, Subset, SubsetIfBigger,
    SubsetIfElem, SubsetIfReducedBigger,
};
pub use transfer::{subset_binary, subset_unary, SubsetBinary, SubsetUnary};
