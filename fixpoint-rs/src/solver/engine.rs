//! The shared fixpoint core driving both the eager and the lazy solver.

use super::{dependencies::DependencyGraph, worklist::Worklist};
use crate::model::{Assignment, ConstraintError, ConstraintPtr, SolveError, UpdateResult, ValueId};
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// How a run of the worklist loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Status {
    /// The worklist drained; the registered constraints are at a fixed point.
    Quiescent,
    /// The cancel flag was observed; the assignment holds all progress so far.
    Cancelled,
}

/// Owns the assignment, the registered constraints, the dependency graph
/// and the worklist of one solve. Every solve starts from a fresh engine;
/// no state leaks to the next one.
pub(crate) struct Engine {
    assignment: Assignment,
    constraints: Vec<ConstraintPtr>,
    /// Distinct constraints already registered, by pointer identity.
    known: HashSet<usize>,
    /// Per constraint, the variables it is already triggered by.
    registered: Vec<HashSet<ValueId>>,
    dependencies: DependencyGraph,
    /// The constraints writing to each variable; consulted when a
    /// non-monotone rewrite forces downstream values to be rebuilt.
    writers: DependencyGraph,
    worklist: Worklist,
    /// Variables that have appeared as an input of some constraint.
    seen_inputs: HashSet<ValueId>,
    /// Inputs seen for the first time and not yet handed to the lazy driver.
    pending_inputs: Vec<ValueId>,
    cancel: Option<Arc<AtomicBool>>,
}

fn ptr_key(constraint: &ConstraintPtr) -> usize {
    Arc::as_ptr(constraint) as *const () as usize
}

impl Engine {
    /// Constructs an engine starting from `seed`.
    pub(crate) fn new(seed: Assignment, cancel: Option<Arc<AtomicBool>>) -> Self {
        Engine {
            assignment: seed,
            constraints: Vec::new(),
            known: HashSet::new(),
            registered: Vec::new(),
            dependencies: DependencyGraph::default(),
            writers: DependencyGraph::default(),
            worklist: Worklist::default(),
            seen_inputs: HashSet::new(),
            pending_inputs: Vec::new(),
            cancel,
        }
    }

    /// Returns the solved (or partially solved) assignment.
    pub(crate) fn into_assignment(self) -> Assignment {
        self.assignment
    }

    /// Returns true if this exact constraint was already registered.
    pub(crate) fn contains(&self, constraint: &ConstraintPtr) -> bool {
        self.known.contains(&ptr_key(constraint))
    }

    /// Registers a constraint and queues it for evaluation.
    ///
    /// Constraints with assignment-dependent dependencies start out
    /// triggered by what they would read right now; further inputs are
    /// picked up after each of their updates.
    pub(crate) fn add_constraint(&mut self, constraint: ConstraintPtr) {
        let ci = self.constraints.len();
        log::debug!("Registering constraint {}", constraint);

        let initial = if constraint.has_dynamic_inputs() {
            constraint.used_inputs(&self.assignment)
        } else {
            constraint.inputs()
        };
        let outputs = constraint.outputs();
        let triggers = if constraint.triggers_on_outputs() {
            outputs.clone()
        } else {
            Vec::new()
        };

        self.known.insert(ptr_key(&constraint));
        self.registered.push(HashSet::new());
        self.worklist.grow(ci + 1);
        self.constraints.push(constraint);

        for v in initial {
            self.register_input(ci, v);
        }
        for v in outputs {
            self.writers.add_dependent(v, ci);
        }
        for v in triggers {
            self.register_trigger(ci, v);
        }
        self.worklist.push(ci);
    }

    /// Hands over the variables first seen as inputs since the last call.
    pub(crate) fn take_pending_inputs(&mut self) -> Vec<ValueId> {
        std::mem::take(&mut self.pending_inputs)
    }

    /// Registers `v` as a trigger of constraint `ci` and returns whether
    /// the edge is new. First sightings are queued for the lazy driver.
    fn register_input(&mut self, ci: usize, v: ValueId) -> bool {
        if self.registered[ci].insert(v) {
            self.dependencies.add_dependent(v, ci);
            if self.seen_inputs.insert(v) {
                self.pending_inputs.push(v);
            }
            true
        } else {
            false
        }
    }

    /// Like [`register_input`](Engine::register_input), but for output
    /// feedback edges, which do not ask for resolution.
    fn register_trigger(&mut self, ci: usize, v: ValueId) {
        if self.registered[ci].insert(v) {
            self.dependencies.add_dependent(v, ci);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }

    /// Runs updates until the worklist drains or the cancel flag is set.
    pub(crate) fn run(&mut self) -> Result<Status, SolveError> {
        loop {
            if self.is_cancelled() {
                log::debug!("Cancel flag observed, stopping");
                return Ok(Status::Cancelled);
            }
            match self.worklist.pop() {
                Some(ci) => self.step(ci)?,
                None => return Ok(Status::Quiescent),
            }
        }
    }

    /// Updates one constraint: advances the assignment, wakes the
    /// dependents of every output that moved, and picks up dependencies
    /// that only now became visible.
    fn step(&mut self, ci: usize) -> Result<(), SolveError> {
        let constraint = self.constraints[ci].clone();
        let outputs = constraint.outputs();
        let before: Vec<u64> = outputs.iter().map(|&v| self.assignment.stamp(v)).collect();

        log::trace!("Updating {}", constraint);
        let result = constraint
            .update(&mut self.assignment)
            .map_err(|e| match e {
                ConstraintError::TypeMismatch(tm) => SolveError::TypeMismatch(tm),
                ConstraintError::Custom(cause) => SolveError::ConstraintUpdate {
                    constraint: constraint.to_string(),
                    cause,
                },
            })?;

        if result == UpdateResult::Altered {
            self.reset_downstream(&outputs);
        }

        if result.changed() {
            for (&v, before) in outputs.iter().zip(before) {
                if self.assignment.stamp(v) != before {
                    for &dependent in self.dependencies.dependents_of(v) {
                        self.worklist.push(dependent);
                    }
                }
            }
        }

        // Dependencies may appear as the assignment grows; re-read them
        // after every update, not only after changing ones, so that a
        // guard that opened without moving the outputs still registers
        // its body inputs.
        if constraint.has_dynamic_inputs() {
            for v in constraint.used_inputs(&self.assignment) {
                if self.register_input(ci, v) && !self.assignment.is_bottom(v) {
                    self.worklist.push(ci);
                }
            }
        }

        Ok(())
    }

    /// Invalidates everything derived from a non-monotone rewrite: every
    /// variable reachable from `outputs` through the dependency graph is
    /// put back to bottom and its writers are queued to rebuild it. The
    /// rewritten outputs themselves keep their fresh values.
    fn reset_downstream(&mut self, outputs: &[ValueId]) {
        let mut visited: HashSet<ValueId> = outputs.iter().copied().collect();
        let mut frontier: Vec<ValueId> = outputs.to_vec();

        while let Some(v) = frontier.pop() {
            let dependents = self.dependencies.dependents_of(v).to_vec();
            for dependent in dependents {
                for o in self.constraints[dependent].outputs() {
                    if visited.insert(o) {
                        log::trace!("Resetting {}", o);
                        self.assignment.reset(o);
                        for &writer in self.writers.dependents_of(o) {
                            self.worklist.push(writer);
                        }
                        frontier.push(o);
                    }
                }
            }
        }
    }
}
