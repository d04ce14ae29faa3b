//! The lazy solver: expands the constraint system on demand from a
//! [`Resolver`] while solving, so only the part of a (possibly infinite)
//! system that is transitively relevant to the seed is ever materialized.

use super::{
    eager::SolveOptions,
    engine::{Engine, Status},
};
use crate::model::{
    Assignment, ConstraintPtr, Constraints, LatticeConflict, ResolverError, SolveError, ValueId,
};
use std::collections::{hash_map::Entry, BTreeSet, HashMap, HashSet};

/// Produces the constraints governing a set of variables.
///
/// The solver calls this with batches of variables it has not seen before;
/// each variable is asked about at most once. Implementations may return
/// constraints for other variables as well (duplicates are filtered by
/// identity), but must never contradict an earlier answer: new constraints
/// may be revealed over time, previously returned ones may not be
/// withdrawn.
pub trait Resolver {
    /// Returns the constraints governing `variables`.
    fn resolve(&mut self, variables: &BTreeSet<ValueId>) -> Result<Constraints, ResolverError>;
}

/// Plain functions make fine resolvers.
impl<F> Resolver for F
where
    F: FnMut(&BTreeSet<ValueId>) -> Constraints,
{
    fn resolve(&mut self, variables: &BTreeSet<ValueId>) -> Result<Constraints, ResolverError> {
        Ok(self(variables))
    }
}

/// A resolver backed by a map from variables to the constraints
/// governing them. Handy for tests and finite systems.
#[derive(Clone, Debug, Default)]
pub struct MapResolver {
    map: HashMap<ValueId, Vec<ConstraintPtr>>,
}

impl MapResolver {
    /// Constructs an empty `MapResolver`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constraint as governing `variable`.
    pub fn register(&mut self, variable: impl Into<ValueId>, constraint: ConstraintPtr) {
        self.map.entry(variable.into()).or_default().push(constraint);
    }
}

impl Resolver for MapResolver {
    fn resolve(&mut self, variables: &BTreeSet<ValueId>) -> Result<Constraints, ResolverError> {
        let mut result = Constraints::new();
        for v in variables {
            if let Some(constraints) = self.map.get(v) {
                for constraint in constraints {
                    result.add(constraint.clone());
                }
            }
        }
        Ok(result)
    }
}

/// Lazily solves for a single seed variable.
///
/// The value of the seed in the result equals what the eager solver would
/// produce on the full system, provided the resolver eventually returns
/// every constraint whose outputs transitively reach the seed. Variables
/// not touched by any resolved constraint stay at bottom.
pub fn solve_lazy<R: Resolver>(
    seed: impl Into<ValueId>,
    resolver: R,
) -> Result<Assignment, SolveError> {
    solve_lazy_all(std::iter::once(seed.into()), resolver)
}

/// Lazily solves for a set of seed variables.
pub fn solve_lazy_all<I, R>(seeds: I, resolver: R) -> Result<Assignment, SolveError>
where
    I: IntoIterator<Item = ValueId>,
    R: Resolver,
{
    solve_lazy_with_options(seeds, resolver, SolveOptions::default())
}

/// Lazily solves with full control over seeding and cancellation.
///
/// The driver alternates between draining the worklist and resolving the
/// batch of variables discovered since the last round, so the resolver
/// always observes a quiescent assignment.
pub fn solve_lazy_with_options<I, R>(
    seeds: I,
    mut resolver: R,
    options: SolveOptions,
) -> Result<Assignment, SolveError>
where
    I: IntoIterator<Item = ValueId>,
    R: Resolver,
{
    let mut engine = Engine::new(options.seed, options.cancel);
    let mut resolved: HashSet<ValueId> = HashSet::new();
    let mut declared: HashMap<u32, ValueId> = HashMap::new();
    let mut unresolved: Vec<ValueId> = seeds.into_iter().collect();

    loop {
        let batch: BTreeSet<ValueId> = unresolved
            .drain(..)
            .filter(|v| !resolved.contains(v))
            .collect();
        if batch.is_empty() {
            break;
        }
        resolved.extend(batch.iter().copied());

        log::debug!("Resolving {} variables", batch.len());
        for constraint in resolver.resolve(&batch)? {
            if engine.contains(&constraint) {
                continue;
            }
            note_declarations(&mut declared, &constraint)?;
            engine.add_constraint(constraint);
        }

        match engine.run()? {
            Status::Quiescent => {}
            Status::Cancelled => {
                return Err(SolveError::Cancelled(Box::new(engine.into_assignment())))
            }
        }
        unresolved = engine.take_pending_inputs();
    }

    Ok(engine.into_assignment())
}

/// Records the lattices a constraint declares for its variables, and
/// rejects a declaration that conflicts with an earlier one for the same
/// raw id.
fn note_declarations(
    declared: &mut HashMap<u32, ValueId>,
    constraint: &ConstraintPtr,
) -> Result<(), SolveError> {
    for v in constraint.inputs().into_iter().chain(constraint.outputs()) {
        match declared.entry(v.id()) {
            Entry::Occupied(previous) => {
                if previous.get().tag() != v.tag() {
                    return Err(LatticeConflict {
                        id: v.id(),
                        first: previous.get().lattice_name(),
                        second: v.lattice_name(),
                    }
                    .into());
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(v);
            }
        }
    }
    Ok(())
}
