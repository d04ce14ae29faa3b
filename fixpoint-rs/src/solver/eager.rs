//! The eager solver: given a fixed set of constraints and an optional
//! seed, reach the least fixed point.

use super::engine::{Engine, Status};
use crate::model::{Assignment, Constraints, SolveError};
use std::sync::{atomic::AtomicBool, Arc};

/// Options controlling a single solve.
///
/// # Examples
///
/// ```rust
/// # use fixpoint_rs::solver::SolveOptionsBuilder;
/// use std::sync::{atomic::AtomicBool, Arc};
///
/// let flag = Arc::new(AtomicBool::new(false));
/// let options = SolveOptionsBuilder::default()
///     .cancel(Some(flag))
///     .build()
///     .unwrap();
/// # drop(options);
/// ```
#[derive(derive_builder::Builder, Clone, Debug, Default)]
#[builder(default)]
pub struct SolveOptions {
    /// The assignment to start from. Seed values are respected: they are
    /// lower bounds of the corresponding results.
    pub seed: Assignment,
    /// A cooperative cancel flag, checked between constraint updates.
    /// When observed, the solve returns
    /// [`SolveError::Cancelled`] carrying the progress made so far.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Solves the given constraints starting from the empty assignment.
///
/// The result is a least fixed point: every constraint's `check` passes,
/// and no smaller assignment above bottom satisfies them all. It does not
/// depend on the order the constraints were added in.
pub fn solve(constraints: &Constraints) -> Result<Assignment, SolveError> {
    solve_with(constraints, Assignment::new())
}

/// Solves the given constraints starting from `seed`.
pub fn solve_with(constraints: &Constraints, seed: Assignment) -> Result<Assignment, SolveError> {
    solve_with_options(
        constraints,
        SolveOptions {
            seed,
            cancel: None,
        },
    )
}

/// Solves the given constraints with full control over seeding and
/// cancellation.
pub fn solve_with_options(
    constraints: &Constraints,
    options: SolveOptions,
) -> Result<Assignment, SolveError> {
    log::info!("Solving {} constraints", constraints.len());
    let mut engine = Engine::new(options.seed, options.cancel);
    for constraint in constraints {
        engine.add_constraint(constraint.clone());
    }
    match engine.run()? {
        Status::Quiescent => Ok(engine.into_assignment()),
        Status::Cancelled => Err(SolveError::Cancelled(Box::new(engine.into_assignment()))),
    }
}
