//! AntPlan - heuristic state evaluation for finite-domain planning
//!
//! Build a [`PlanningTask`], pick an [`EvaluatorConfig`], hand both to an
//! [`AntPlanEvaluator`] together with an oracle, then call
//! [`AntPlanEvaluator::evaluate`] for each state the search expands.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use antplan::prelude::*;
//!
//! let task = PlanningTask::new(
//!     vec![
//!         Variable::new("A", ["A=0", "A=1"]),
//!         Variable::new("B", ["B=0", "B=1"]),
//!     ],
//!     vec![
//!         Operator::new("set_A", 1).with_precondition(0, 0).with_effect(0, 1),
//!         Operator::new("set_B", 1).with_precondition(0, 1).with_effect(1, 1),
//!     ],
//!     vec![FactPair::new(1, 1)],
//!     vec![0, 0],
//! )
//! .unwrap();
//! let task = Arc::new(task);
//!
//! let config = EvaluatorConfig::new().with_composition(Composition::Sum);
//! let oracle = SharedOracle::new(ConstantOracle::new(1.0));
//! let mut evaluator = AntPlanEvaluator::new(task.clone(), config, oracle).unwrap();
//!
//! let evaluation = evaluator.evaluate(task.initial_state()).unwrap();
//! assert_eq!(evaluation.value, HeuristicValue::Estimate(3));
//! assert!(evaluation.preferred.contains(&0));
//! ```

#[cfg(feature = "logging")]
pub mod logging;

// Task model
pub use antplan_core::{Effect, FactPair, Operator, PlanningTask, State, TaskError, Variable};

// Configuration
pub use antplan_config::{
    Composition, ConfigError, EvaluatorConfig, OracleBinding, OracleFailurePolicy,
    RelaxedDistanceVariant,
};

// Evaluator
pub use antplan_heuristic::{
    AntPlanEvaluator, Evaluation, EvaluatorError, EvaluatorStats, HeuristicValue, DEAD_END,
};

// Oracles
pub use antplan_heuristic::oracle::{
    ConstantOracle, FnOracle, Oracle, OracleEvalError, OracleInitError, SharedOracle, Snapshot,
};
#[cfg(feature = "python")]
pub use antplan_heuristic::oracle::PythonOracle;

/// Everything needed to build and run an evaluator.
pub mod prelude {
    pub use crate::{
        AntPlanEvaluator, Composition, ConstantOracle, EvaluatorConfig, FactPair, FnOracle,
        HeuristicValue, Operator, Oracle, OracleFailurePolicy, PlanningTask,
        RelaxedDistanceVariant, SharedOracle, Snapshot, State, Variable,
    };
}

/// Builds an evaluator from a configuration file.
///
/// YAML for `.yaml`/`.yml` files, TOML otherwise.
pub fn evaluator_from_file<O: Oracle>(
    task: std::sync::Arc<PlanningTask>,
    path: impl AsRef<std::path::Path>,
    oracle: SharedOracle<O>,
) -> Result<AntPlanEvaluator<O>, EvaluatorError> {
    let config = EvaluatorConfig::load(path)?;
    tracing::debug!(event = "config_loaded", composition = %config.composition);
    AntPlanEvaluator::new(task, config, oracle)
}
