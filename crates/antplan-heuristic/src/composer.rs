//! Composition of relaxed distance and oracle score into one value.

use std::fmt;

/// Raw value reserved for dead ends, distinct from every estimate.
pub const DEAD_END: i32 = i32::MAX;

/// Largest finite estimate.
pub const MAX_ESTIMATE: i32 = DEAD_END - 1;

/// The value returned to the outer search for one state.
///
/// # Example
///
/// ```
/// use antplan_heuristic::{HeuristicValue, DEAD_END};
///
/// assert_eq!(HeuristicValue::estimate(-3), HeuristicValue::Estimate(0));
/// assert_eq!(HeuristicValue::DeadEnd.to_raw(), DEAD_END);
/// assert_eq!(HeuristicValue::from_raw(DEAD_END), HeuristicValue::DeadEnd);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeuristicValue {
    /// Finite, non-negative cost estimate.
    Estimate(i32),
    /// Goal unreachable, or oracle failure configured as unsolvable.
    DeadEnd,
}

impl HeuristicValue {
    /// Wraps an estimate, clamping it into `0..=MAX_ESTIMATE`.
    #[inline]
    pub fn estimate(value: i32) -> Self {
        HeuristicValue::Estimate(value.clamp(0, MAX_ESTIMATE))
    }

    /// Rounds a real-valued estimate to the nearest integer.
    ///
    /// Non-finite and negative values become zero; values beyond
    /// [`MAX_ESTIMATE`] saturate.
    pub fn from_f64(value: f64) -> Self {
        let value = normalize_score(value).round();
        if value >= MAX_ESTIMATE as f64 {
            HeuristicValue::Estimate(MAX_ESTIMATE)
        } else {
            HeuristicValue::Estimate(value as i32)
        }
    }

    /// Decodes the raw integer form.
    pub fn from_raw(raw: i32) -> Self {
        if raw == DEAD_END {
            HeuristicValue::DeadEnd
        } else {
            HeuristicValue::estimate(raw)
        }
    }

    /// Encodes as the raw integer form, [`DEAD_END`] for dead ends.
    #[inline]
    pub fn to_raw(self) -> i32 {
        match self {
            HeuristicValue::Estimate(value) => value,
            HeuristicValue::DeadEnd => DEAD_END,
        }
    }

    #[inline]
    pub fn is_dead_end(self) -> bool {
        matches!(self, HeuristicValue::DeadEnd)
    }

    /// Returns the estimate, `None` for dead ends.
    #[inline]
    pub fn value(self) -> Option<i32> {
        match self {
            HeuristicValue::Estimate(value) => Some(value),
            HeuristicValue::DeadEnd => None,
        }
    }
}

impl fmt::Display for HeuristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicValue::Estimate(value) => write!(f, "{value}"),
            HeuristicValue::DeadEnd => write!(f, "dead end"),
        }
    }
}

/// Clamps an oracle score: NaN and infinities become 0, negatives become 0.
#[inline]
pub fn normalize_score(score: f64) -> f64 {
    if score.is_finite() && score > 0.0 {
        score
    } else {
        0.0
    }
}

/// Inputs gathered for one state, combined by [`compose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ingredients {
    /// Relaxed distance alone.
    Relaxed(HeuristicValue),
    /// Normalized oracle score of the state alone.
    Oracle(f64),
    /// Relaxed distance and normalized oracle score of the state.
    Sum(HeuristicValue, f64),
    /// Minimum over frontier nodes of `distance + score`, already folded.
    Frontier(HeuristicValue, Option<f64>),
}

/// Combines the ingredients into the returned value.
///
/// A relaxed dead end wins over any oracle score.
pub fn compose(ingredients: Ingredients) -> HeuristicValue {
    match ingredients {
        Ingredients::Relaxed(relaxed) => relaxed,
        Ingredients::Oracle(score) => HeuristicValue::from_f64(score),
        Ingredients::Sum(HeuristicValue::DeadEnd, _)
        | Ingredients::Frontier(HeuristicValue::DeadEnd, _) => HeuristicValue::DeadEnd,
        Ingredients::Sum(HeuristicValue::Estimate(distance), score) => {
            HeuristicValue::from_f64(distance as f64 + normalize_score(score))
        }
        Ingredients::Frontier(HeuristicValue::Estimate(distance), best) => match best {
            Some(best) => HeuristicValue::from_f64(best),
            // Nothing scored: fall back to the relaxed distance.
            None => HeuristicValue::estimate(distance),
        },
    }
}

/// Running minimum of `distance + score` over frontier nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontierMinimum {
    best: Option<f64>,
    scored: usize,
}

impl FrontierMinimum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers one frontier node.
    pub fn offer(&mut self, distance: i32, score: f64) {
        let combined = distance as f64 + normalize_score(score);
        self.scored += 1;
        self.best = Some(match self.best {
            Some(best) => best.min(combined),
            None => combined,
        });
    }

    pub fn best(&self) -> Option<f64> {
        self.best
    }

    pub fn scored(&self) -> usize {
        self.scored
    }
}
