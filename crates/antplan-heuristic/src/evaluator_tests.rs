//! Tests for the evaluator wiring: errors, fallbacks, frontier scoring, stats.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use antplan_config::{Composition, OracleFailurePolicy, RelaxedDistanceVariant};
use antplan_core::State;
use antplan_test::gripper::gripper;
use antplan_test::switches::{switches, unreachable_switches, SET_A, SET_B};

use super::*;
use crate::oracle::{ConstantOracle, FnOracle, OracleBinding, OracleInitError};

/// Ready only while the shared flag is set.
#[derive(Debug)]
struct Switchable {
    ready: Arc<AtomicBool>,
}

impl Oracle for Switchable {
    fn ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn initialize(&mut self, _binding: &OracleBinding) -> std::result::Result<(), OracleInitError> {
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn score(&mut self, _snapshot: &Snapshot<'_>) -> std::result::Result<f64, OracleEvalError> {
        Ok(1.0)
    }
}

/// Always fails to bind.
#[derive(Debug)]
struct Unbindable;

impl Oracle for Unbindable {
    fn ready(&self) -> bool {
        false
    }

    fn initialize(&mut self, binding: &OracleBinding) -> std::result::Result<(), OracleInitError> {
        Err(OracleInitError::MissingEntryPoint {
            resource: binding.resource.clone().unwrap_or_default(),
            entry_point: binding.entry_point.clone(),
            available: vec!["other_fn".to_string()],
        })
    }

    fn score(&mut self, _snapshot: &Snapshot<'_>) -> std::result::Result<f64, OracleEvalError> {
        Err(OracleEvalError::NotReady)
    }
}

fn switches_task() -> Arc<PlanningTask> {
    Arc::new(switches())
}

fn relaxed_only() -> EvaluatorConfig {
    EvaluatorConfig::new().with_composition(Composition::RelaxedOnly)
}

#[test]
fn test_switches_relaxed_plan() {
    let task = switches_task();
    let oracle = SharedOracle::new(ConstantOracle::new(0.0));
    let mut evaluator = AntPlanEvaluator::new(task.clone(), relaxed_only(), oracle).unwrap();

    let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
    assert_eq!(evaluation.value, HeuristicValue::Estimate(2));
    assert_eq!(evaluation.preferred, BTreeSet::from([SET_A]));
    assert!(evaluator.relaxed_plan().contains(SET_A));
    assert!(evaluator.relaxed_plan().contains(SET_B));
    assert_eq!(evaluator.stats().oracle_calls, 0);
}

#[test]
fn test_state_size_mismatch() {
    let task = switches_task();
    let oracle = SharedOracle::new(ConstantOracle::new(0.0));
    let mut evaluator = AntPlanEvaluator::new(task, relaxed_only(), oracle).unwrap();

    let err = evaluator.evaluate(&State::new(vec![0])).unwrap_err();
    assert!(matches!(
        err,
        EvaluatorError::StateMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn test_value_out_of_range() {
    let task = switches_task();
    let oracle = SharedOracle::new(ConstantOracle::new(0.0));
    let mut evaluator = AntPlanEvaluator::new(task, relaxed_only(), oracle).unwrap();

    let err = evaluator.evaluate(&State::new(vec![0, 2])).unwrap_err();
    match err {
        EvaluatorError::ValueOutOfRange { var, value, domain } => {
            assert_eq!(var, "B");
            assert_eq!(value, 2);
            assert_eq!(domain, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = EvaluatorConfig::new()
        .with_relaxed_distance(RelaxedDistanceVariant::None)
        .with_composition(Composition::FrontierMin);
    let oracle = SharedOracle::new(ConstantOracle::new(0.0));
    let err = AntPlanEvaluator::new(switches_task(), config, oracle).unwrap_err();
    assert!(matches!(err, EvaluatorError::Config(_)));
}

#[test]
fn test_init_failure_is_fatal() {
    let config = EvaluatorConfig::new().with_oracle("oracle", "anticipatory_cost_fn");
    let err = AntPlanEvaluator::new(switches_task(), config, SharedOracle::new(Unbindable))
        .unwrap_err();

    assert!(matches!(
        err,
        EvaluatorError::OracleInit(OracleInitError::MissingEntryPoint { .. })
    ));
    assert!(err.to_string().contains("other_fn"));
}

#[test]
fn test_second_evaluator_cannot_rebind_shared_oracle() {
    let flag = Arc::new(AtomicBool::new(false));
    let oracle = SharedOracle::new(Switchable { ready: flag });
    let first = EvaluatorConfig::new().with_oracle("oracle", "one");
    let second = EvaluatorConfig::new().with_oracle("oracle", "two");

    AntPlanEvaluator::new(switches_task(), first.clone(), oracle.clone()).unwrap();
    let err = AntPlanEvaluator::new(switches_task(), second, oracle.clone()).unwrap_err();
    assert!(matches!(
        err,
        EvaluatorError::OracleInit(OracleInitError::BindingConflict { .. })
    ));
    assert!(AntPlanEvaluator::new(switches_task(), first, oracle).is_ok());
}

#[test]
fn test_relaxed_only_skips_oracle_binding() {
    let evaluator = AntPlanEvaluator::new(switches_task(), relaxed_only(), SharedOracle::new(Unbindable));
    assert!(evaluator.is_ok());
}

#[test]
fn test_not_ready_oracle_fails_fast() {
    let ready = Arc::new(AtomicBool::new(false));
    let oracle = SharedOracle::new(Switchable {
        ready: Arc::clone(&ready),
    });
    let task = switches_task();
    let mut evaluator = AntPlanEvaluator::new(task.clone(), EvaluatorConfig::new(), oracle).unwrap();
    assert!(evaluator.evaluate(task.initial_state()).is_ok());

    ready.store(false, Ordering::SeqCst);
    let err = evaluator.evaluate(task.initial_state()).unwrap_err();
    assert!(matches!(err, EvaluatorError::OracleNotReady));
}

#[test]
fn test_failure_warns_once_and_counts() {
    let task = Arc::new(gripper(2));
    let oracle = SharedOracle::new(FnOracle::new(|_: &Snapshot<'_>| {
        Err(OracleEvalError::Faulted("division by zero".to_string()))
    }));
    let config = EvaluatorConfig::new().with_cache(false);
    let mut evaluator = AntPlanEvaluator::new(task.clone(), config, oracle).unwrap();

    for _ in 0..3 {
        let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
        assert_eq!(evaluation.value, HeuristicValue::Estimate(0));
    }
    assert!(evaluator.failure_reported);
    assert_eq!(evaluator.stats().oracle_calls, 3);
    assert_eq!(evaluator.stats().oracle_failures, 3);
}

#[test]
fn test_failure_as_dead_end_clears_preferred() {
    let task = switches_task();
    let oracle = SharedOracle::new(FnOracle::new(|_: &Snapshot<'_>| {
        Err(OracleEvalError::Faulted("boom".to_string()))
    }));
    let config = EvaluatorConfig::new().with_oracle_failure_policy(OracleFailurePolicy::DeadEnd);
    let mut evaluator = AntPlanEvaluator::new(task.clone(), config, oracle).unwrap();

    let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
    assert!(evaluation.is_dead_end());
    assert_eq!(evaluation.raw(), crate::DEAD_END);
    assert!(evaluation.preferred.is_empty());
    assert_eq!(evaluator.stats().dead_ends, 1);
}

/// Scores the switches task: goal reached 0, `A=1` 4, otherwise 10.
fn switches_oracle() -> FnOracle<impl FnMut(&Snapshot<'_>) -> std::result::Result<f64, OracleEvalError> + Send> {
    FnOracle::new(|snapshot: &Snapshot<'_>| {
        Ok(if snapshot.get("B") == Some("B=1") {
            0.0
        } else if snapshot.get("A") == Some("A=1") {
            4.0
        } else {
            10.0
        })
    })
}

#[test]
fn test_frontier_min_scores_every_frontier_node() {
    let task = switches_task();
    let config = EvaluatorConfig::new().with_composition(Composition::FrontierMin);
    let mut evaluator =
        AntPlanEvaluator::new(task.clone(), config, SharedOracle::new(switches_oracle())).unwrap();

    // root 0 + 10, A=1 at 1 + 4, B=1 at 2 + 0
    let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
    assert_eq!(evaluation.value, HeuristicValue::Estimate(2));
    assert_eq!(evaluator.stats().oracle_calls, 3);
}

#[test]
fn test_frontier_nodes_are_scored_in_their_relaxed_state() {
    let task = switches_task();
    let config = EvaluatorConfig::new().with_composition(Composition::FrontierMin);
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let oracle = FnOracle::new(move |snapshot: &Snapshot<'_>| {
        recorder.lock().unwrap().push(snapshot.to_map());
        Ok(1.0)
    });
    let mut evaluator = AntPlanEvaluator::new(task.clone(), config, SharedOracle::new(oracle)).unwrap();

    evaluator.evaluate(task.initial_state()).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    let goal_snapshot = seen
        .iter()
        .find(|snapshot| snapshot.get("B").map(String::as_str) == Some("B=1"))
        .unwrap();
    assert_eq!(goal_snapshot.get("A").map(String::as_str), Some("A=1"));
}

#[test]
fn test_frontier_limit() {
    let task = switches_task();
    let mut config = EvaluatorConfig::new().with_composition(Composition::FrontierMin);
    config.frontier_limit = Some(1);
    let mut evaluator =
        AntPlanEvaluator::new(task.clone(), config, SharedOracle::new(switches_oracle())).unwrap();

    let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
    assert_eq!(evaluation.value, HeuristicValue::Estimate(5));
    assert_eq!(evaluator.stats().oracle_calls, 2);
}

#[test]
fn test_sum_composition() {
    let task = switches_task();
    let config = EvaluatorConfig::new().with_composition(Composition::Sum);
    let oracle = SharedOracle::new(ConstantOracle::new(1.4));
    let mut evaluator = AntPlanEvaluator::new(task.clone(), config, oracle).unwrap();

    let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
    assert_eq!(evaluation.value, HeuristicValue::Estimate(3));
}

#[test]
fn test_additive_relaxed_distance() {
    let task = Arc::new(gripper(2));
    let config = relaxed_only().with_relaxed_distance(RelaxedDistanceVariant::Additive);
    let oracle = SharedOracle::new(ConstantOracle::new(0.0));
    let mut evaluator = AntPlanEvaluator::new(task.clone(), config, oracle).unwrap();

    let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
    assert_eq!(evaluation.value, HeuristicValue::Estimate(6));
}

#[test]
fn test_relaxed_dead_end_skips_oracle() {
    let task = Arc::new(unreachable_switches());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let oracle = SharedOracle::new(FnOracle::new(move |_: &Snapshot<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(1.0)
    }));
    let config = EvaluatorConfig::new().with_lookahead(1, 2, 16);
    let mut evaluator = AntPlanEvaluator::new(task.clone(), config, oracle).unwrap();

    let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
    assert!(evaluation.is_dead_end());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(evaluator.stats().probes, 0);
}

#[test]
fn test_cache_hit_returns_empty_preferred() {
    let task = switches_task();
    let oracle = SharedOracle::new(ConstantOracle::new(0.0));
    let mut evaluator = AntPlanEvaluator::new(task.clone(), relaxed_only(), oracle).unwrap();

    let first = evaluator.evaluate(task.initial_state()).unwrap();
    let second = evaluator.evaluate(task.initial_state()).unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.value, second.value);
    assert!(second.preferred.is_empty());
    assert_eq!(evaluator.stats().cache_hits, 1);
    assert_eq!(evaluator.stats().cache_misses, 1);
    assert_eq!(evaluator.stats().hit_rate(), 0.5);
}

#[test]
fn test_clear_cache() {
    let task = switches_task();
    let oracle = SharedOracle::new(ConstantOracle::new(0.0));
    let mut evaluator = AntPlanEvaluator::new(task.clone(), relaxed_only(), oracle).unwrap();

    evaluator.evaluate(task.initial_state()).unwrap();
    assert_eq!(evaluator.cache_len(), 1);
    evaluator.clear_cache();
    assert_eq!(evaluator.cache_len(), 0);
    assert!(!evaluator.evaluate(task.initial_state()).unwrap().cache_hit);
}

#[test]
fn test_log_states_does_not_change_value() {
    let task = switches_task();
    let mut config = relaxed_only();
    config.log_states = true;
    let oracle = SharedOracle::new(ConstantOracle::new(0.0));
    let mut evaluator = AntPlanEvaluator::new(task.clone(), config, oracle).unwrap();

    let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
    assert_eq!(evaluation.value, HeuristicValue::Estimate(2));
}

#[test]
fn test_probe_stats() {
    let task = Arc::new(gripper(2));
    let config = EvaluatorConfig::new()
        .with_relaxed_distance(RelaxedDistanceVariant::None)
        .with_lookahead(1, 1, 8);
    let oracle = SharedOracle::new(ConstantOracle::new(3.0));
    let mut evaluator = AntPlanEvaluator::new(task.clone(), config, oracle).unwrap();

    evaluator.evaluate(task.initial_state()).unwrap();
    let stats = evaluator.stats();
    assert_eq!(stats.probes, 1);
    // move plus one pick per ball
    assert_eq!(stats.probe_successors, 3);
    assert_eq!(stats.oracle_calls, 4);
}
