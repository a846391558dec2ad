//! AntPlan Heuristic Engine
//!
//! This crate provides the state evaluator including:
//! - Relaxed reachability (max and additive propagation) over a flat
//!   proposition arena, with relaxed plan extraction and preferred operators
//! - The oracle interface, a shared oracle handle and built-in oracles
//! - Memoization of composed values by state fingerprint
//! - A bounded lookahead probe that flags extra preferred operators
//! - Composition of relaxed distance and oracle score
//!
//! The Python oracle is available behind the `python` feature.

pub mod cache;
pub mod composer;
pub mod error;
pub mod evaluator;
pub mod lookahead;
pub mod oracle;
pub mod relaxation;
pub mod stats;

pub use cache::HeuristicCache;
pub use composer::{HeuristicValue, DEAD_END, MAX_ESTIMATE};
pub use error::{EvaluatorError, Result};
pub use evaluator::{AntPlanEvaluator, Evaluation};
pub use lookahead::{LookaheadProbe, LookaheadSchedule, LookaheadSettings, ProbeReport};
pub use oracle::{
    ConstantOracle, FnOracle, Oracle, OracleEvalError, OracleInitError, SharedOracle, Snapshot,
    SymbolTable,
};
#[cfg(feature = "python")]
pub use oracle::PythonOracle;
pub use relaxation::{PropagationRule, RelaxationGraph, RelaxedPlan};
pub use stats::EvaluatorStats;
