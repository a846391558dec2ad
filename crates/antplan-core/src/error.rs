//! Error types for AntPlan task models

use thiserror::Error;

/// Errors raised while building or validating a planning task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// A variable was declared without any values.
    #[error("Variable '{0}' has an empty domain")]
    EmptyDomain(String),

    /// A fact refers to a variable index the task does not have.
    #[error("Unknown variable index {var} (task has {num_vars} variables)")]
    UnknownVariable { var: usize, num_vars: usize },

    /// A fact assigns a value outside its variable's domain.
    #[error("Value {value} is outside the domain of variable '{name}' (size {domain})")]
    ValueOutOfDomain {
        name: String,
        value: usize,
        domain: usize,
    },

    /// An operator carries a negative cost.
    #[error("Operator '{name}' has negative cost {cost}")]
    NegativeCost { name: String, cost: i32 },

    /// A state does not assign exactly one value per variable.
    #[error("State assigns {actual} variables, task has {expected}")]
    StateSize { expected: usize, actual: usize },

    /// The same variable appears twice with different values in one condition set.
    #[error("Contradictory condition on variable '{0}'")]
    Contradiction(String),
}

/// Result type alias for task operations
pub type Result<T> = std::result::Result<T, TaskError>;
