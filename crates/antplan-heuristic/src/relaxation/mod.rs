//! Delete-relaxation reachability over a flattened proposition space.
//!
//! Every `(variable, value)` fact becomes one [`Proposition`]; every operator
//! effect becomes one [`UnaryOperator`] whose preconditions are the
//! operator's preconditions plus the effect's conditions. Both arrays live in
//! a [`RelaxationGraph`] and are reset, not reallocated, on each exploration.

mod explore;
mod plan;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use antplan_core::{FactPair, PlanningTask};
use smallvec::SmallVec;

pub use explore::{ExplorationStats, FrontierNode, PropagationRule};
pub use plan::RelaxedPlan;

/// Index of a proposition in the flattened fact space.
pub type PropId = usize;

/// Index of a unary operator.
pub type OpId = usize;

/// Cost of a proposition not reached (yet).
pub const UNREACHED: i32 = -1;

/// A fact flattened into the global proposition index space.
#[derive(Debug, Clone)]
pub struct Proposition {
    pub fact: FactPair,
    /// Best known distance, [`UNREACHED`] until enqueued.
    pub cost: i32,
    /// Unary operator that achieved `cost`; `None` for facts true in the state.
    pub reached_by: Option<OpId>,
    pub is_goal: bool,
    /// Visited during relaxed plan extraction.
    pub marked: bool,
}

/// Relaxed projection of one operator effect.
#[derive(Debug, Clone)]
pub struct UnaryOperator {
    pub preconditions: SmallVec<[PropId; 4]>,
    pub effect: PropId,
    pub base_cost: i32,
    /// Preconditions not yet popped in the current exploration.
    pub unsatisfied_preconditions: usize,
    /// Accumulated cost once every precondition is satisfied.
    pub cost: i32,
    /// Index of the originating task operator.
    pub operator_no: usize,
}

/// Proposition and operator arena for one planning task.
///
/// Not re-entrant: an exploration mutates the per-proposition and
/// per-operator labels in place.
#[derive(Debug)]
pub struct RelaxationGraph {
    propositions: Vec<Proposition>,
    operators: Vec<UnaryOperator>,
    precondition_of: Vec<Vec<OpId>>,
    proposition_offsets: Vec<usize>,
    goal_propositions: Vec<PropId>,
    operators_without_preconditions: Vec<OpId>,
    num_task_operators: usize,
    queue: BinaryHeap<Reverse<(i32, PropId)>>,
    stats: ExplorationStats,
}

impl RelaxationGraph {
    /// Builds the proposition and unary operator arrays for `task`.
    pub fn new(task: &PlanningTask) -> Self {
        let mut proposition_offsets = Vec::with_capacity(task.num_variables());
        let mut propositions = Vec::new();
        for (var, variable) in task.variables().iter().enumerate() {
            proposition_offsets.push(propositions.len());
            propositions.extend((0..variable.domain_size()).map(|value| Proposition {
                fact: FactPair::new(var, value),
                cost: UNREACHED,
                reached_by: None,
                is_goal: false,
                marked: false,
            }));
        }

        let prop_id = |fact: FactPair| proposition_offsets[fact.var] + fact.value;

        let mut operators = Vec::new();
        for (operator_no, op) in task.operators().iter().enumerate() {
            for effect in &op.effects {
                let effect_id = prop_id(effect.fact);
                let mut preconditions: SmallVec<[PropId; 4]> = op
                    .preconditions
                    .iter()
                    .chain(effect.conditions.iter())
                    .map(|&fact| prop_id(fact))
                    .collect();
                preconditions.sort_unstable();
                preconditions.dedup();

                // An effect already required by its own preconditions adds nothing.
                if preconditions.contains(&effect_id) {
                    continue;
                }

                operators.push(UnaryOperator {
                    unsatisfied_preconditions: preconditions.len(),
                    preconditions,
                    effect: effect_id,
                    base_cost: op.cost,
                    cost: op.cost,
                    operator_no,
                });
            }
        }

        let mut precondition_of = vec![Vec::new(); propositions.len()];
        let mut operators_without_preconditions = Vec::new();
        for (op_id, op) in operators.iter().enumerate() {
            if op.preconditions.is_empty() {
                operators_without_preconditions.push(op_id);
            }
            for &pre in &op.preconditions {
                precondition_of[pre].push(op_id);
            }
        }

        let mut goal_propositions: Vec<PropId> =
            task.goals().iter().map(|&fact| prop_id(fact)).collect();
        goal_propositions.sort_unstable();
        goal_propositions.dedup();
        for &goal in &goal_propositions {
            propositions[goal].is_goal = true;
        }

        Self {
            propositions,
            operators,
            precondition_of,
            proposition_offsets,
            goal_propositions,
            operators_without_preconditions,
            num_task_operators: task.operators().len(),
            queue: BinaryHeap::new(),
            stats: ExplorationStats::default(),
        }
    }

    #[inline]
    pub fn prop_id(&self, fact: FactPair) -> PropId {
        self.proposition_offsets[fact.var] + fact.value
    }

    #[inline]
    pub fn proposition(&self, id: PropId) -> &Proposition {
        &self.propositions[id]
    }

    #[inline]
    pub fn operator(&self, id: OpId) -> &UnaryOperator {
        &self.operators[id]
    }

    #[inline]
    pub fn num_propositions(&self) -> usize {
        self.propositions.len()
    }

    #[inline]
    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    /// Number of operators of the task the graph was built from.
    #[inline]
    pub fn num_task_operators(&self) -> usize {
        self.num_task_operators
    }

    #[inline]
    pub fn goal_propositions(&self) -> &[PropId] {
        &self.goal_propositions
    }

    /// Counters of the most recent exploration.
    #[inline]
    pub fn stats(&self) -> &ExplorationStats {
        &self.stats
    }

    /// Relaxed cost of a fact after the most recent exploration.
    pub fn fact_cost(&self, fact: FactPair) -> Option<i32> {
        let cost = self.propositions[self.prop_id(fact)].cost;
        (cost != UNREACHED).then_some(cost)
    }

    fn reset(&mut self) {
        for prop in &mut self.propositions {
            prop.cost = UNREACHED;
            prop.reached_by = None;
            prop.marked = false;
        }
        for op in &mut self.operators {
            op.unsatisfied_preconditions = op.preconditions.len();
            op.cost = op.base_cost;
        }
        self.queue.clear();
        self.stats = ExplorationStats::default();
    }
}
