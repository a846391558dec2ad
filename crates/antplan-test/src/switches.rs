//! Two binary switches.
//!
//! `set_A` flips `A` from 0 to 1; `set_B` sets `B` to 1 but needs `A=1`.
//! The goal is `B=1`, so from `{A=0, B=0}` the max-propagation distance is 2.
//!
//! # Example
//!
//! ```
//! use antplan_test::switches::switches;
//!
//! let task = switches();
//! assert_eq!(task.initial_state().values(), &[0, 0]);
//! assert_eq!(task.goals().len(), 1);
//! ```

use antplan_core::{FactPair, Operator, PlanningTask, Variable};

/// Variable index of `A`.
pub const VAR_A: usize = 0;
/// Variable index of `B`.
pub const VAR_B: usize = 1;
/// Operator index of `set_A`.
pub const SET_A: usize = 0;
/// Operator index of `set_B`.
pub const SET_B: usize = 1;

fn variables() -> Vec<Variable> {
    vec![
        Variable::new("A", ["A=0", "A=1"]),
        Variable::new("B", ["B=0", "B=1"]),
    ]
}

/// The two-switch task with goal `B=1` from `{A=0, B=0}`.
pub fn switches() -> PlanningTask {
    PlanningTask::new(
        variables(),
        vec![
            Operator::new("set_A", 1)
                .with_precondition(VAR_A, 0)
                .with_effect(VAR_A, 1),
            Operator::new("set_B", 1)
                .with_precondition(VAR_A, 1)
                .with_effect(VAR_B, 1),
        ],
        vec![FactPair::new(VAR_B, 1)],
        vec![0, 0],
    )
    .expect("switches fixture is valid")
}

/// Same variables, but only `set_A` exists, so `B=1` is unreachable.
pub fn unreachable_switches() -> PlanningTask {
    PlanningTask::new(
        variables(),
        vec![Operator::new("set_A", 1)
            .with_precondition(VAR_A, 0)
            .with_effect(VAR_A, 1)],
        vec![FactPair::new(VAR_B, 1)],
        vec![0, 0],
    )
    .expect("unreachable switches fixture is valid")
}
