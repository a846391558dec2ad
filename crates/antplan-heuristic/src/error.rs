//! Error types for the evaluator.

use antplan_config::ConfigError;
use antplan_core::TaskError;
use thiserror::Error;

use crate::oracle::OracleInitError;

/// Errors that stop an evaluator from producing estimates.
///
/// Per-call oracle failures are not part of this enum: they are replaced by
/// the configured fallback value and only show up in statistics and logs.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// The oracle could not be bound. Fatal for the evaluator instance.
    #[error("Oracle initialization failed: {0}")]
    OracleInit(#[from] OracleInitError),

    /// The oracle is not ready although the configuration needs it.
    #[error("Oracle is not ready")]
    OracleNotReady,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid task: {0}")]
    Task(#[from] TaskError),

    /// The state does not assign exactly one value per task variable.
    #[error("State has {actual} values, task has {expected} variables")]
    StateMismatch { expected: usize, actual: usize },

    /// A state value lies outside its variable's domain.
    #[error("Value {value} of variable '{var}' is outside its domain (size {domain})")]
    ValueOutOfRange {
        var: String,
        value: usize,
        domain: usize,
    },
}

impl EvaluatorError {
    /// Maps state validation failures to their evaluator counterparts.
    pub(crate) fn from_state_error(err: TaskError) -> Self {
        match err {
            TaskError::StateSize { expected, actual } => {
                EvaluatorError::StateMismatch { expected, actual }
            }
            TaskError::ValueOutOfDomain {
                name,
                value,
                domain,
            } => EvaluatorError::ValueOutOfRange {
                var: name,
                value,
                domain,
            },
            other => EvaluatorError::Task(other),
        }
    }
}

/// Result type alias for evaluator operations
pub type Result<T> = std::result::Result<T, EvaluatorError>;
