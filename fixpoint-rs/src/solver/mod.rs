//! The solver engines: eager solving of a fixed constraint set, lazy
//! expansion from a [`Resolver`], and diagnostic rendering of the
//! dependency structure.

mod dependencies;
mod dot;
mod eager;
mod engine;
mod lazy;
mod worklist;

pub use dot::{to_dot, to_dot_with};
pub use eager::{solve, solve_with, solve_with_options, SolveOptions, SolveOptionsBuilder};
pub use lazy::{solve_lazy, solve_lazy_all, solve_lazy_with_options, MapResolver, Resolver};
