//! Label-correcting relaxed exploration.

use std::cmp::Reverse;

use antplan_core::{FactPair, State};

use super::{OpId, PropId, RelaxationGraph, UNREACHED};
use crate::composer::HeuristicValue;

/// How an operator's cost accumulates over its preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationRule {
    /// `cost = max(cost, base_cost + precondition_cost)`; goal distance is
    /// the max over goals.
    Max,
    /// `cost = base_cost + sum(precondition_cost)`; goal distance is the sum
    /// over goals.
    Additive,
}

/// A proposition popped during exploration that was not true in the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierNode {
    pub prop: PropId,
    pub fact: FactPair,
    pub cost: i32,
}

/// Counters of one exploration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorationStats {
    /// Queue entries pushed.
    pub enqueued: u64,
    /// Queue entries skipped because a cheaper label already existed.
    pub stale_pops: u64,
    /// Propositions expanded.
    pub expanded: u64,
    /// Unary operators whose preconditions all became satisfied.
    pub triggered: u64,
}

impl RelaxationGraph {
    /// Propagates relaxed costs from `state` until every goal is popped.
    ///
    /// Returns [`HeuristicValue::DeadEnd`] if some goal proposition stays
    /// unreached. When `frontier` is given, every expanded proposition not
    /// true in `state` is appended in nondecreasing cost order.
    pub fn explore(
        &mut self,
        state: &State,
        rule: PropagationRule,
        mut frontier: Option<&mut Vec<FrontierNode>>,
    ) -> HeuristicValue {
        self.reset();

        for fact in state.facts() {
            let prop = self.prop_id(fact);
            self.enqueue_if_necessary(prop, 0, None);
        }
        for i in 0..self.operators_without_preconditions.len() {
            let op_id = self.operators_without_preconditions[i];
            let (effect, cost) = {
                let op = &self.operators[op_id];
                (op.effect, op.base_cost)
            };
            self.stats.triggered += 1;
            self.enqueue_if_necessary(effect, cost, Some(op_id));
        }

        let mut unsolved_goals = self.goal_propositions.len();
        while let Some(Reverse((distance, prop_id))) = self.queue.pop() {
            let prop_cost = self.propositions[prop_id].cost;
            debug_assert!(prop_cost != UNREACHED && prop_cost <= distance);
            if prop_cost < distance {
                self.stats.stale_pops += 1;
                continue;
            }
            self.stats.expanded += 1;

            let prop = &self.propositions[prop_id];
            if prop.reached_by.is_some() {
                if let Some(nodes) = frontier.as_deref_mut() {
                    nodes.push(FrontierNode {
                        prop: prop_id,
                        fact: prop.fact,
                        cost: prop_cost,
                    });
                }
            }
            if prop.is_goal {
                unsolved_goals -= 1;
                if unsolved_goals == 0 {
                    break;
                }
            }

            for i in 0..self.precondition_of[prop_id].len() {
                let op_id = self.precondition_of[prop_id][i];
                let op = &mut self.operators[op_id];
                op.cost = match rule {
                    PropagationRule::Max => op.cost.max(op.base_cost.saturating_add(prop_cost)),
                    PropagationRule::Additive => op.cost.saturating_add(prop_cost),
                };
                debug_assert!(op.unsatisfied_preconditions > 0);
                op.unsatisfied_preconditions -= 1;
                if op.unsatisfied_preconditions == 0 {
                    let (effect, cost) = (op.effect, op.cost);
                    self.stats.triggered += 1;
                    self.enqueue_if_necessary(effect, cost, Some(op_id));
                }
            }
        }
        self.queue.clear();

        self.goal_distance(rule)
    }

    /// Relaxed state under which `prop` was reached: `state` with every fact
    /// on its achiever chain applied in cost order, `prop` itself last.
    ///
    /// Only meaningful after an exploration of `state` that reached `prop`.
    pub fn relaxed_state(&self, state: &State, prop: PropId) -> State {
        let mut seen = vec![false; self.propositions.len()];
        let mut support: Vec<PropId> = Vec::new();
        let mut worklist = vec![prop];
        while let Some(prop_id) = worklist.pop() {
            if seen[prop_id] {
                continue;
            }
            seen[prop_id] = true;
            let Some(op_id) = self.propositions[prop_id].reached_by else {
                continue;
            };
            if prop_id != prop {
                support.push(prop_id);
            }
            worklist.extend(self.operators[op_id].preconditions.iter().copied());
        }
        support.sort_by_key(|&id| (self.propositions[id].cost, id));

        let mut values = state.values().to_vec();
        for id in support.into_iter().chain(std::iter::once(prop)) {
            let fact = self.propositions[id].fact;
            values[fact.var] = fact.value;
        }
        State::new(values)
    }

    fn enqueue_if_necessary(&mut self, prop_id: PropId, cost: i32, op_id: Option<OpId>) {
        debug_assert!(cost >= 0);
        let prop = &mut self.propositions[prop_id];
        if prop.cost == UNREACHED || cost < prop.cost {
            prop.cost = cost;
            prop.reached_by = op_id;
            self.queue.push(Reverse((cost, prop_id)));
            self.stats.enqueued += 1;
        }
    }

    fn goal_distance(&self, rule: PropagationRule) -> HeuristicValue {
        let mut total: i32 = 0;
        for &goal in &self.goal_propositions {
            let cost = self.propositions[goal].cost;
            if cost == UNREACHED {
                return HeuristicValue::DeadEnd;
            }
            total = match rule {
                PropagationRule::Max => total.max(cost),
                PropagationRule::Additive => total.saturating_add(cost),
            };
        }
        HeuristicValue::estimate(total)
    }
}
