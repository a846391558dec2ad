//! Oracles that need no external resource.

use std::fmt::{self, Debug};

use super::{Oracle, OracleBinding, OracleEvalError, OracleInitError, Snapshot};

/// Scores every snapshot with the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantOracle {
    value: f64,
}

impl ConstantOracle {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Oracle for ConstantOracle {
    fn ready(&self) -> bool {
        true
    }

    fn initialize(&mut self, _binding: &OracleBinding) -> Result<(), OracleInitError> {
        Ok(())
    }

    fn score(&mut self, _snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError> {
        Ok(self.value)
    }
}

/// Oracle backed by a closure.
///
/// # Example
///
/// ```
/// use antplan_heuristic::oracle::{FnOracle, Oracle, Snapshot};
///
/// let oracle = FnOracle::new(|snapshot: &Snapshot<'_>| Ok(snapshot.len() as f64));
/// assert!(oracle.ready());
/// ```
pub struct FnOracle<F>
where
    F: FnMut(&Snapshot<'_>) -> Result<f64, OracleEvalError> + Send,
{
    score_fn: F,
}

impl<F> FnOracle<F>
where
    F: FnMut(&Snapshot<'_>) -> Result<f64, OracleEvalError> + Send,
{
    pub fn new(score_fn: F) -> Self {
        Self { score_fn }
    }
}

impl<F> Debug for FnOracle<F>
where
    F: FnMut(&Snapshot<'_>) -> Result<f64, OracleEvalError> + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOracle").finish()
    }
}

impl<F> Oracle for FnOracle<F>
where
    F: FnMut(&Snapshot<'_>) -> Result<f64, OracleEvalError> + Send,
{
    fn ready(&self) -> bool {
        true
    }

    fn initialize(&mut self, _binding: &OracleBinding) -> Result<(), OracleInitError> {
        Ok(())
    }

    fn score(&mut self, snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError> {
        (self.score_fn)(snapshot)
    }
}
