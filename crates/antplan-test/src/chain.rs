//! A chain of binary variables.
//!
//! `step_i` sets `v_i=1` and needs `v_{i-1}=1`; `step_0` has no
//! precondition. The goal is `v_{n-1}=1`, at relaxed distance `n`.

use antplan_core::{FactPair, Operator, PlanningTask, Variable};

/// Builds a chain of `n` variables, all initially 0.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn chain(n: usize) -> PlanningTask {
    assert!(n > 0, "chain needs at least one variable");

    let variables = (0..n)
        .map(|i| Variable::new(format!("v{i}"), [format!("v{i}=0"), format!("v{i}=1")]))
        .collect();

    let operators = (0..n)
        .map(|i| {
            let op = Operator::new(format!("step_{i}"), 1).with_effect(i, 1);
            if i == 0 {
                op
            } else {
                op.with_precondition(i - 1, 1)
            }
        })
        .collect();

    PlanningTask::new(variables, operators, vec![FactPair::new(n - 1, 1)], vec![0; n])
        .expect("chain fixture is valid")
}
