//! Evaluator statistics.

use std::time::{Duration, Instant};

/// Counters accumulated over the lifetime of one evaluator.
///
/// # Example
///
/// ```
/// use antplan_heuristic::stats::EvaluatorStats;
///
/// let mut stats = EvaluatorStats::default();
/// stats.start();
/// stats.record_evaluation();
/// stats.record_cache_lookup(false);
/// stats.record_evaluation();
/// stats.record_cache_lookup(true);
///
/// assert_eq!(stats.evaluations, 2);
/// assert_eq!(stats.hit_rate(), 0.5);
/// ```
#[derive(Debug, Default, Clone)]
pub struct EvaluatorStats {
    start_time: Option<Instant>,
    /// States evaluated, cache hits included.
    pub evaluations: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Full clears caused by reaching capacity.
    pub cache_clears: u64,
    /// Oracle calls, successful or not.
    pub oracle_calls: u64,
    pub oracle_failures: u64,
    /// Evaluations that returned a dead end.
    pub dead_ends: u64,
    /// Lookahead probe sessions run.
    pub probes: u64,
    /// Successors scored by lookahead probes.
    pub probe_successors: u64,
}

impl EvaluatorStats {
    /// Marks the start of the evaluator's lifetime.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Time since [`start`](Self::start).
    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn record_evaluation(&mut self) {
        self.evaluations += 1;
    }

    pub fn record_cache_lookup(&mut self, hit: bool) {
        if hit {
            self.cache_hits += 1;
        } else {
            self.cache_misses += 1;
        }
    }

    pub fn record_cache_clear(&mut self) {
        self.cache_clears += 1;
    }

    /// Records one oracle call and whether it failed.
    pub fn record_oracle_call(&mut self, failed: bool) {
        self.oracle_calls += 1;
        if failed {
            self.oracle_failures += 1;
        }
    }

    pub fn record_dead_end(&mut self) {
        self.dead_ends += 1;
    }

    /// Records one probe session and the successors it scored.
    pub fn record_probe(&mut self, successors: u64) {
        self.probes += 1;
        self.probe_successors += successors;
    }

    /// Cache hits over cache lookups.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }

    /// Evaluations per second since start.
    pub fn evaluations_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.evaluations as f64 / secs
        } else {
            0.0
        }
    }
}
