//! The state evaluator handed to an outer search.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use antplan_config::{Composition, EvaluatorConfig, OracleFailurePolicy, RelaxedDistanceVariant};
use antplan_core::{PlanningTask, State};
use tracing::{debug, error, info, trace, warn};

use crate::cache::HeuristicCache;
use crate::composer::{compose, normalize_score, FrontierMinimum, HeuristicValue, Ingredients};
use crate::error::{EvaluatorError, Result};
use crate::lookahead::{LookaheadProbe, LookaheadSettings};
use crate::oracle::{Oracle, OracleEvalError, SharedOracle, Snapshot, SymbolTable};
use crate::relaxation::{FrontierNode, PropagationRule, RelaxationGraph, RelaxedPlan};
use crate::stats::EvaluatorStats;

/// Result of evaluating one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub value: HeuristicValue,
    /// Operator indices the outer search should try first.
    pub preferred: BTreeSet<usize>,
    /// The value came from the memoization cache.
    pub cache_hit: bool,
}

impl Evaluation {
    /// Integer form of the value, [`DEAD_END`](crate::DEAD_END) for dead ends.
    #[inline]
    pub fn raw(&self) -> i32 {
        self.value.to_raw()
    }

    #[inline]
    pub fn is_dead_end(&self) -> bool {
        self.value.is_dead_end()
    }
}

/// Heuristic evaluator combining relaxed reachability with an oracle.
///
/// One instance evaluates one state at a time; its proposition arrays,
/// cache and symbol table are private to it. The oracle may be shared with
/// other evaluators through its [`SharedOracle`] handle.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use antplan_config::{Composition, EvaluatorConfig};
/// use antplan_core::{FactPair, Operator, PlanningTask, Variable};
/// use antplan_heuristic::oracle::{ConstantOracle, SharedOracle};
/// use antplan_heuristic::{AntPlanEvaluator, HeuristicValue};
///
/// let task = PlanningTask::new(
///     vec![Variable::new("light", ["off", "on"])],
///     vec![Operator::new("switch", 1).with_precondition(0, 0).with_effect(0, 1)],
///     vec![FactPair::new(0, 1)],
///     vec![0],
/// )
/// .unwrap();
/// let task = Arc::new(task);
///
/// let config = EvaluatorConfig::new().with_composition(Composition::RelaxedOnly);
/// let oracle = SharedOracle::new(ConstantOracle::new(0.0));
/// let mut evaluator = AntPlanEvaluator::new(task.clone(), config, oracle).unwrap();
///
/// let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
/// assert_eq!(evaluation.value, HeuristicValue::Estimate(1));
/// assert!(evaluation.preferred.contains(&0));
/// ```
#[derive(Debug)]
pub struct AntPlanEvaluator<O: Oracle> {
    task: Arc<PlanningTask>,
    config: EvaluatorConfig,
    oracle: SharedOracle<O>,
    graph: RelaxationGraph,
    rule: Option<PropagationRule>,
    relaxed_plan: RelaxedPlan,
    frontier: Vec<FrontierNode>,
    cache: HeuristicCache,
    probe: Option<LookaheadProbe>,
    symbols: OnceLock<SymbolTable>,
    stats: EvaluatorStats,
    failure_reported: bool,
}

impl<O: Oracle> AntPlanEvaluator<O> {
    /// Builds an evaluator and binds the oracle if the configuration uses it.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::Config`] for an invalid configuration and
    /// [`EvaluatorError::OracleInit`] if the oracle cannot be bound. Neither
    /// degrades to a fallback estimate.
    pub fn new(
        task: Arc<PlanningTask>,
        config: EvaluatorConfig,
        oracle: SharedOracle<O>,
    ) -> Result<Self> {
        config.validate()?;
        if config.needs_oracle() {
            oracle.ensure_ready(&config.oracle_binding())?;
        }

        let rule = match config.compute_relaxed_distance_variant {
            RelaxedDistanceVariant::None => None,
            RelaxedDistanceVariant::Max => Some(PropagationRule::Max),
            RelaxedDistanceVariant::Additive => Some(PropagationRule::Additive),
        };
        let cache = if config.enable_cache {
            HeuristicCache::new(config.cache_capacity)
        } else {
            HeuristicCache::disabled()
        };
        let probe = config
            .enable_lookahead
            .then(|| LookaheadProbe::new(LookaheadSettings::from_config(&config)));
        let graph = RelaxationGraph::new(&task);

        info!(
            event = "evaluator_init",
            variables = task.num_variables(),
            operators = task.operators().len(),
            propositions = graph.num_propositions(),
            unary_operators = graph.num_operators(),
            relaxed = %config.compute_relaxed_distance_variant,
            composition = %config.composition,
            cache = cache.is_enabled(),
            lookahead = probe.is_some(),
        );

        let mut stats = EvaluatorStats::default();
        stats.start();

        Ok(Self {
            relaxed_plan: RelaxedPlan::new(task.operators().len()),
            task,
            config,
            oracle,
            graph,
            rule,
            frontier: Vec::new(),
            cache,
            probe,
            symbols: OnceLock::new(),
            stats,
            failure_reported: false,
        })
    }

    /// Evaluates `state`.
    ///
    /// # Errors
    ///
    /// Fails if `state` does not fit the task, or if the configuration needs
    /// the oracle and it is not ready. Oracle scoring failures are not
    /// errors; they fall back per [`OracleFailurePolicy`].
    pub fn evaluate(&mut self, state: &State) -> Result<Evaluation> {
        self.task
            .validate_state(state)
            .map_err(EvaluatorError::from_state_error)?;
        if self.config.needs_oracle() && !self.oracle.is_ready() {
            error!(event = "oracle_not_ready");
            return Err(EvaluatorError::OracleNotReady);
        }

        self.stats.record_evaluation();
        let evaluation_no = self.stats.evaluations;
        if self.config.log_states {
            self.log_state(state);
        }

        let key = state.fingerprint();
        if self.cache.is_enabled() {
            let hit = self.cache.get(key);
            self.stats.record_cache_lookup(hit.is_some());
            if let Some(value) = hit {
                if value.is_dead_end() {
                    self.stats.record_dead_end();
                }
                return Ok(Evaluation {
                    value,
                    preferred: BTreeSet::new(),
                    cache_hit: true,
                });
            }
        }

        let mut preferred = BTreeSet::new();
        let (value, root_score) = self.compute(state, &mut preferred);

        if !value.is_dead_end()
            && self
                .probe
                .as_mut()
                .is_some_and(|probe| probe.should_probe(evaluation_no))
        {
            let root = match root_score {
                Some(score) => Some(score),
                None => self.call_oracle(state).ok(),
            };
            if let Some(root) = root {
                self.run_probe(state, root, &mut preferred);
            }
        }

        if value.is_dead_end() {
            self.stats.record_dead_end();
            preferred.clear();
        }
        if self.cache.insert(key, value) {
            self.stats.record_cache_clear();
        }

        Ok(Evaluation {
            value,
            preferred,
            cache_hit: false,
        })
    }

    /// Computes the composed value, returning the oracle score of `state`
    /// too when it was needed.
    fn compute(
        &mut self,
        state: &State,
        preferred: &mut BTreeSet<usize>,
    ) -> (HeuristicValue, Option<f64>) {
        let composition = self.config.composition;

        let relaxed = match self.rule {
            Some(rule) => {
                self.frontier.clear();
                let frontier = (composition == Composition::FrontierMin).then_some(&mut self.frontier);
                let relaxed = self.graph.explore(state, rule, frontier);
                if relaxed.is_dead_end() {
                    return (HeuristicValue::DeadEnd, None);
                }
                self.graph
                    .extract_relaxed_plan(state, &mut self.relaxed_plan, preferred);
                relaxed
            }
            None => {
                self.relaxed_plan.clear();
                HeuristicValue::Estimate(0)
            }
        };

        match composition {
            Composition::RelaxedOnly => (compose(Ingredients::Relaxed(relaxed)), None),
            Composition::OracleOnly => match self.score_with_fallback(state) {
                Some(score) => (compose(Ingredients::Oracle(score)), Some(score)),
                None => (HeuristicValue::DeadEnd, None),
            },
            Composition::Sum => match self.score_with_fallback(state) {
                Some(score) => (compose(Ingredients::Sum(relaxed, score)), Some(score)),
                None => (HeuristicValue::DeadEnd, None),
            },
            Composition::FrontierMin => {
                let Some(root) = self.score_with_fallback(state) else {
                    return (HeuristicValue::DeadEnd, None);
                };
                let mut minimum = FrontierMinimum::new();
                minimum.offer(0, root);

                let frontier = std::mem::take(&mut self.frontier);
                let limit = self.config.frontier_limit.unwrap_or(usize::MAX);
                let mut dead = false;
                for node in frontier.iter().take(limit) {
                    let frontier_state = self.graph.relaxed_state(state, node.prop);
                    match self.score_with_fallback(&frontier_state) {
                        Some(score) => minimum.offer(node.cost, score),
                        None => {
                            dead = true;
                            break;
                        }
                    }
                }
                self.frontier = frontier;

                if dead {
                    (HeuristicValue::DeadEnd, None)
                } else {
                    (compose(Ingredients::Frontier(relaxed, minimum.best())), Some(root))
                }
            }
        }
    }

    /// Scores `state`, applying the failure policy: `None` means dead end.
    fn score_with_fallback(&mut self, state: &State) -> Option<f64> {
        match self.call_oracle(state) {
            Ok(score) => Some(score),
            Err(_) => match self.config.on_oracle_error {
                OracleFailurePolicy::Zero => Some(0.0),
                OracleFailurePolicy::DeadEnd => None,
            },
        }
    }

    /// One recorded oracle call; the score comes back normalized.
    fn call_oracle(&mut self, state: &State) -> std::result::Result<f64, OracleEvalError> {
        let table = self.symbols.get_or_init(|| SymbolTable::new(&self.task));
        let result = self.oracle.score(&Snapshot::new(table, state.values()));
        self.stats.record_oracle_call(result.is_err());
        match result {
            Ok(score) => Ok(normalize_score(score)),
            Err(err) => {
                self.report_failure(&err);
                Err(err)
            }
        }
    }

    fn report_failure(&mut self, err: &OracleEvalError) {
        if self.failure_reported {
            debug!(event = "oracle_failure", error = %err);
        } else {
            self.failure_reported = true;
            warn!(
                event = "oracle_failure",
                error = %err,
                policy = ?self.config.on_oracle_error,
                "oracle evaluation failed, substituting fallback value; later failures log at debug",
            );
        }
    }

    fn run_probe(&mut self, state: &State, cost: f64, preferred: &mut BTreeSet<usize>) {
        let Self {
            task,
            oracle,
            symbols,
            probe,
            stats,
            ..
        } = self;
        let Some(probe) = probe.as_mut() else {
            return;
        };
        let task: &PlanningTask = task;
        let table = symbols.get_or_init(|| SymbolTable::new(task));

        let score = |successor: &State| oracle.score(&Snapshot::new(table, successor.values()));
        let report = probe.run(task, state, cost, score, preferred);

        let calls = report.scored + report.failures;
        stats.record_probe(calls);
        stats.oracle_calls += calls;
        stats.oracle_failures += report.failures;
    }

    fn log_state(&self, state: &State) {
        let dump = state
            .facts()
            .map(|fact| format!("{}: {}", self.task.variables()[fact.var].name, self.task.fact_name(fact)))
            .collect::<Vec<_>>()
            .join(", ");
        trace!(event = "evaluate_state", fingerprint = state.fingerprint(), state = %dump);
    }

    pub fn task(&self) -> &Arc<PlanningTask> {
        &self.task
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn oracle(&self) -> &SharedOracle<O> {
        &self.oracle
    }

    pub fn stats(&self) -> &EvaluatorStats {
        &self.stats
    }

    /// Number of cached values.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Relaxed plan of the most recent cache miss.
    pub fn relaxed_plan(&self) -> &RelaxedPlan {
        &self.relaxed_plan
    }

    /// Drops all cached values.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
