//! External scoring delegates.
//!
//! An [`Oracle`] maps a symbolic [`Snapshot`] (variable name to fact name)
//! to a scalar cost. It owns its initialization lifecycle; the evaluator only
//! reaches it through a [`SharedOracle`] handle, which serializes every call.

mod builtin;
#[cfg(feature = "python")]
mod python;
mod shared;
mod snapshot;

use thiserror::Error;

pub use antplan_config::OracleBinding;
pub use builtin::{ConstantOracle, FnOracle};
#[cfg(feature = "python")]
pub use python::PythonOracle;
pub use shared::{OracleSession, SharedOracle};
pub use snapshot::{Snapshot, SymbolTable};

/// A scoring delegate.
///
/// # Example
///
/// ```
/// use antplan_heuristic::oracle::{Oracle, OracleBinding, OracleEvalError, OracleInitError, Snapshot};
///
/// /// Counts variables whose fact mentions "roomb".
/// struct RoomCounter;
///
/// impl Oracle for RoomCounter {
///     fn ready(&self) -> bool {
///         true
///     }
///
///     fn initialize(&mut self, _binding: &OracleBinding) -> Result<(), OracleInitError> {
///         Ok(())
///     }
///
///     fn score(&mut self, snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError> {
///         Ok(snapshot.iter().filter(|(_, fact)| fact.contains("roomb")).count() as f64)
///     }
/// }
/// ```
pub trait Oracle: Send {
    /// Returns true once initialization has completed.
    fn ready(&self) -> bool;

    /// Binds the oracle to a resource and entry point.
    ///
    /// # Errors
    ///
    /// Returns [`OracleInitError`] if the resource or entry point cannot be
    /// loaded. The evaluator treats this as fatal.
    fn initialize(&mut self, binding: &OracleBinding) -> Result<(), OracleInitError>;

    /// Scores one snapshot.
    ///
    /// Must not assume anything about the caller's engine state. Returned
    /// values are normalized by the caller, so NaN or negative results are
    /// tolerated but not useful.
    fn score(&mut self, snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError>;
}

/// Fatal oracle binding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleInitError {
    #[error("No oracle resource configured")]
    MissingResource,

    #[error("Oracle resource '{resource}' could not be loaded: {reason}")]
    ResourceUnavailable { resource: String, reason: String },

    #[error(
        "Entry point '{entry_point}' not found in '{resource}' (available: {})",
        list_or_none(.available)
    )]
    MissingEntryPoint {
        resource: String,
        entry_point: String,
        available: Vec<String>,
    },

    #[error("Oracle already bound to '{active}', cannot rebind to '{requested}'")]
    BindingConflict {
        active: OracleBinding,
        requested: OracleBinding,
    },

    #[error("Oracle reported not ready after initialization")]
    Incomplete,

    #[error("Oracle lock poisoned by an earlier panic")]
    Poisoned,
}

/// Per-call oracle failure; the evaluator substitutes a fallback value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleEvalError {
    #[error("Oracle faulted: {0}")]
    Faulted(String),

    #[error("Oracle panicked: {0}")]
    Panicked(String),

    #[error("Oracle lock poisoned by an earlier panic")]
    Poisoned,

    #[error("Oracle is not initialized")]
    NotReady,
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests;
