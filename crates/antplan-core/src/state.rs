//! Planning states and their fingerprints.

use crate::task::FactPair;

/// 64-bit state fingerprint used as a memoization and duplicate-detection key.
///
/// Not collision free. Callers treat a fingerprint match as advisory.
pub type StateFingerprint = u64;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// A full assignment: one value per task variable.
///
/// States are immutable snapshots; successor generation builds a new state.
///
/// # Example
///
/// ```
/// use antplan_core::{FactPair, State};
///
/// let state = State::new(vec![0, 1]);
/// assert!(state.holds(FactPair::new(1, 1)));
///
/// let next = state.with_fact(FactPair::new(0, 1));
/// assert_eq!(next.values(), &[1, 1]);
/// assert_ne!(state.fingerprint(), next.fingerprint());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct State {
    values: Vec<usize>,
}

impl State {
    pub fn new(values: Vec<usize>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn values(&self) -> &[usize] {
        &self.values
    }

    #[inline]
    pub fn value(&self, var: usize) -> usize {
        self.values[var]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if the fact is true in this state.
    #[inline]
    pub fn holds(&self, fact: FactPair) -> bool {
        self.values.get(fact.var) == Some(&fact.value)
    }

    /// Iterates the state as `(var, value)` facts in variable order.
    pub fn facts(&self) -> impl Iterator<Item = FactPair> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(var, &value)| FactPair::new(var, value))
    }

    /// Returns a copy of this state with one variable reassigned.
    pub fn with_fact(&self, fact: FactPair) -> Self {
        let mut values = self.values.clone();
        values[fact.var] = fact.value;
        Self { values }
    }

    /// Computes the FNV-1a fingerprint of the assignment.
    ///
    /// Variable order matters: each value is mixed with its variable index
    /// before folding, so swapping two values changes the fingerprint.
    pub fn fingerprint(&self) -> StateFingerprint {
        self.values
            .iter()
            .enumerate()
            .fold(FNV_OFFSET_BASIS, |hash, (var, &value)| {
                let word = (value as u64)
                    .wrapping_add(GOLDEN_GAMMA)
                    .wrapping_add((var as u64) << 1);
                (hash ^ word).wrapping_mul(FNV_PRIME)
            })
    }
}

impl From<Vec<usize>> for State {
    fn from(values: Vec<usize>) -> Self {
        Self::new(values)
    }
}
