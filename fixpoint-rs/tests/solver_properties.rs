//! Properties the solver guarantees: determinism, idempotence, respect
//! for seed values, and faithful surfacing of constraint failures.

use fixpoint_rs::constraints::{elem, subset, subset_if_bigger, subset_if_elem};
use fixpoint_rs::model::{
    Assignment, Constraint, ConstraintError, ConstraintPtr, Constraints, SetLattice, SolveError,
    TypedValueId, UpdateResult, ValueId,
};
use fixpoint_rs::solver::{solve, solve_with, solve_with_options, SolveOptionsBuilder};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

type IntVar = TypedValueId<SetLattice<i32>>;

fn s(id: u32) -> IntVar {
    TypedValueId::new(id)
}

fn set(elements: &[i32]) -> BTreeSet<i32> {
    elements.iter().copied().collect()
}

fn guarded_problem() -> Vec<ConstraintPtr> {
    vec![
        elem(5, s(1)),
        elem(6, s(1)),
        subset(s(1), s(2)),
        subset(s(2), s(3)),
        subset(s(4), s(3)),
        elem(7, s(5)),
        subset_if_elem(6, s(3), s(5), s(3)),
        subset_if_bigger(s(2), 1, s(3), s(6)),
    ]
}

#[test]
fn repeated_solves_agree() {
    let problem: Constraints = guarded_problem().into();
    let first = solve(&problem).unwrap();
    let second = solve(&problem).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_map(), second.to_map());
}

#[test]
fn result_does_not_depend_on_registration_order() {
    let reference = solve(&guarded_problem().into()).unwrap();

    let mut rng = StdRng::seed_from_u64(0xf1f2f3f4);
    for _ in 0..20 {
        let mut constraints = guarded_problem();
        constraints.shuffle(&mut rng);
        let shuffled: Constraints = constraints.into();
        let result = solve(&shuffled).unwrap();
        assert_eq!(result, reference);
    }
}

#[test]
fn solving_a_solution_changes_nothing() {
    let problem: Constraints = guarded_problem().into();
    let solution = solve(&problem).unwrap();
    let again = solve_with(&problem, solution.clone()).unwrap();
    assert_eq!(again, solution);
}

#[test]
fn seed_values_are_lower_bounds_of_the_result() {
    let problem: Constraints = vec![elem(1, s(1)), subset(s(1), s(2))].into();

    let mut seed = Assignment::new();
    seed.set(s(2), set(&[42]));
    seed.set(s(4), set(&[9]));

    let result = solve_with(&problem, seed.clone()).unwrap();
    assert!(seed.less_or_equal(&result));
    // Solved values grew on top of the seed.
    assert_eq!(result.peek(s(2)), Some(&set(&[1, 42])));
    // Variables no constraint touches keep their seeded value.
    assert_eq!(result.peek(s(4)), Some(&set(&[9])));
}

#[test]
fn size_guard_fires_exactly_above_the_boundary() {
    let base = vec![
        elem(1, s(1)),
        elem(2, s(1)),
        elem(3, s(1)),
        elem(7, s(2)),
    ];

    // Threshold size - 1: the guard fires.
    let mut constraints = base.clone();
    constraints.push(subset_if_bigger(s(1), 2, s(2), s(3)));
    let result = solve(&constraints.into()).unwrap();
    assert_eq!(result.peek(s(3)), Some(&set(&[7])));

    // Threshold size: it does not.
    let mut constraints = base.clone();
    constraints.push(subset_if_bigger(s(1), 3, s(2), s(3)));
    let result = solve(&constraints.into()).unwrap();
    assert!(result.is_bottom(s(3)));

    // A negative threshold never fires.
    let mut constraints = base;
    constraints.push(subset_if_bigger(s(1), -1, s(2), s(3)));
    let result = solve(&constraints.into()).unwrap();
    assert!(result.is_bottom(s(3)));
}

// A constraint that always fails, for exercising the error path.

#[derive(Clone, Debug)]
struct Failing {
    output: IntVar,
}

impl Constraint for Failing {
    fn inputs(&self) -> Vec<ValueId> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.output.into()]
    }

    fn update(&self, _assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        Err(ConstraintError::Custom("synthetic failure".to_string()))
    }

    fn check(&self, _assignment: &Assignment) -> bool {
        false
    }
}

impl fmt::Display for Failing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fail {}", self.output)
    }
}

// A constraint that trips the cooperative cancel flag from inside its own
// update, after making some progress of its own.

#[derive(Debug)]
struct CancelNow {
    flag: Arc<AtomicBool>,
    output: IntVar,
}

impl Constraint for CancelNow {
    fn inputs(&self) -> Vec<ValueId> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<ValueId> {
        vec![self.output.into()]
    }

    fn update(&self, assignment: &mut Assignment) -> Result<UpdateResult, ConstraintError> {
        assignment.get_mut(self.output).insert(2);
        self.flag.store(true, Ordering::SeqCst);
        Ok(UpdateResult::Incremented)
    }

    fn check(&self, _assignment: &Assignment) -> bool {
        true
    }
}

impl fmt::Display for CancelNow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cancel after {}", self.output)
    }
}

#[test]
fn cancellation_mid_solve_keeps_monotone_progress() {
    let flag = Arc::new(AtomicBool::new(false));

    // Runs in registration order: the elem makes progress, the second
    // constraint raises the flag, and the subset never gets to run.
    let problem: Constraints = vec![
        elem(1, s(1)),
        Arc::new(CancelNow {
            flag: flag.clone(),
            output: s(2),
        }) as ConstraintPtr,
        subset(s(1), s(3)),
    ]
    .into();

    let options = SolveOptionsBuilder::default()
        .cancel(Some(flag))
        .build()
        .unwrap();

    match solve_with_options(&problem, options) {
        Err(SolveError::Cancelled(partial)) => {
            assert_eq!(partial.peek(s(1)), Some(&set(&[1])));
            assert_eq!(partial.peek(s(2)), Some(&set(&[2])));
            assert!(partial.is_bottom(s(3)));
        }
        other => panic!("expected cancellation, got {:?}", other),
    }
}

#[test]
fn constraint_failures_surface_with_their_cause() {
    let problem: Constraints = vec![
        elem(1, s(1)),
        Arc::new(Failing { output: s(2) }) as ConstraintPtr,
    ]
    .into();

    match solve(&problem) {
        Err(SolveError::ConstraintUpdate { constraint, cause }) => {
            assert_eq!(constraint, "fail v2");
            assert_eq!(cause, "synthetic failure");
        }
        other => panic!("expected a constraint failure, got {:?}", other),
    }
}
