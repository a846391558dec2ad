//! Relaxed plan extraction and preferred operator marking.

use std::collections::BTreeSet;

use antplan_core::State;

use super::{PropId, RelaxationGraph, UNREACHED};

/// Task operators used by the extracted relaxed plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelaxedPlan {
    used: Vec<bool>,
}

impl RelaxedPlan {
    /// Creates an empty plan over `num_operators` task operators.
    pub fn new(num_operators: usize) -> Self {
        Self {
            used: vec![false; num_operators],
        }
    }

    pub fn clear(&mut self) {
        self.used.fill(false);
    }

    #[inline]
    pub fn contains(&self, operator_no: usize) -> bool {
        self.used.get(operator_no).copied().unwrap_or(false)
    }

    fn mark(&mut self, operator_no: usize) {
        self.used[operator_no] = true;
    }

    /// Iterates used operator indices, ascending.
    pub fn operators(&self) -> impl Iterator<Item = usize> + '_ {
        self.used
            .iter()
            .enumerate()
            .filter(|(_, &used)| used)
            .map(|(index, _)| index)
    }

    /// Number of distinct operators in the plan.
    pub fn len(&self) -> usize {
        self.used.iter().filter(|&&used| used).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.used.iter().any(|&used| used)
    }

    /// Raw boolean vector indexed by task operator.
    pub fn as_slice(&self) -> &[bool] {
        &self.used
    }
}

impl RelaxationGraph {
    /// Walks achievers back from every goal, filling `plan` and `preferred`.
    ///
    /// An operator is preferred when all of its preconditions were already
    /// true in `state`. Only meaningful after an exploration of `state` that
    /// reached every goal.
    pub fn extract_relaxed_plan(
        &mut self,
        state: &State,
        plan: &mut RelaxedPlan,
        preferred: &mut BTreeSet<usize>,
    ) {
        plan.clear();
        let mut worklist: Vec<PropId> = self.goal_propositions.clone();

        while let Some(prop_id) = worklist.pop() {
            let prop = &mut self.propositions[prop_id];
            if prop.marked {
                continue;
            }
            prop.marked = true;
            debug_assert!(prop.cost != UNREACHED, "plan walk reached an unreached fact");

            let Some(op_id) = prop.reached_by else {
                continue;
            };
            let op = &self.operators[op_id];
            let mut is_preferred = true;
            for &pre in &op.preconditions {
                if self.propositions[pre].reached_by.is_some() {
                    is_preferred = false;
                }
                worklist.push(pre);
            }

            plan.mark(op.operator_no);
            if is_preferred {
                debug_assert!(
                    op.preconditions
                        .iter()
                        .all(|&pre| state.holds(self.propositions[pre].fact)),
                    "preferred operator {} not applicable",
                    op.operator_no
                );
                preferred.insert(op.operator_no);
            }
        }
    }
}
