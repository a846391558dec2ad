//! Bounded lookahead probe for extra preferred operators.
//!
//! From the evaluated state the probe scores successors with the oracle,
//! keeps those that improve on the current score by the configured margin,
//! and recurses into the best few. It never changes the returned value: it
//! only adds operator indices to the preferred set.
//!
//! Every recursion level is bounded by a depth counter and one budget shared
//! by the whole session and decremented per candidate successor.

use std::collections::{BTreeSet, HashSet};

use antplan_config::EvaluatorConfig;
use antplan_core::{PlanningTask, State, StateFingerprint};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::composer::normalize_score;
use crate::oracle::OracleEvalError;

/// Probe knobs, taken from [`EvaluatorConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct LookaheadSettings {
    pub frequency: u64,
    pub adapt_interval: Option<u64>,
    pub depth: usize,
    pub budget: u64,
    pub width: usize,
    pub visited_capacity: usize,
    pub improvement_threshold: f64,
    pub random_seed: Option<u64>,
}

impl LookaheadSettings {
    pub fn from_config(config: &EvaluatorConfig) -> Self {
        Self {
            frequency: config.lookahead_frequency.max(1),
            adapt_interval: config.lookahead_adapt_interval.filter(|&n| n > 0),
            depth: config.lookahead_depth,
            budget: config.lookahead_budget,
            width: config.lookahead_width,
            visited_capacity: config.lookahead_visited_capacity,
            improvement_threshold: config.improvement_threshold,
            random_seed: config.random_seed,
        }
    }
}

/// Decides which evaluations run a probe.
///
/// The interval between probes is `frequency`, or with an adapt interval
/// `frequency * (1 + evaluations / adapt_interval)`, so probes get rarer as
/// search goes on. The first evaluation always probes.
#[derive(Debug, Clone)]
pub struct LookaheadSchedule {
    frequency: u64,
    adapt_interval: Option<u64>,
    next_at: u64,
}

impl LookaheadSchedule {
    pub fn new(frequency: u64, adapt_interval: Option<u64>) -> Self {
        Self {
            frequency: frequency.max(1),
            adapt_interval,
            next_at: 1,
        }
    }

    /// Current distance between probes after `evaluations` evaluations.
    pub fn interval(&self, evaluations: u64) -> u64 {
        match self.adapt_interval {
            Some(adapt) => self
                .frequency
                .saturating_mul(1 + evaluations / adapt),
            None => self.frequency,
        }
    }

    /// Returns true if evaluation number `evaluation` (1-based) should probe.
    pub fn should_probe(&mut self, evaluation: u64) -> bool {
        if evaluation < self.next_at {
            return false;
        }
        self.next_at = evaluation.saturating_add(self.interval(evaluation));
        true
    }
}

/// What one probe session did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Successors scored successfully.
    pub scored: u64,
    /// Successors skipped because the oracle failed.
    pub failures: u64,
    /// Budget left when the session ended.
    pub budget_left: u64,
    /// Operators newly marked preferred.
    pub marked: usize,
}

/// Lookahead state kept across evaluations.
#[derive(Debug)]
pub struct LookaheadProbe {
    settings: LookaheadSettings,
    schedule: LookaheadSchedule,
    visited: HashSet<StateFingerprint>,
    rng: Option<ChaCha8Rng>,
}

struct Session<'a, F> {
    task: &'a PlanningTask,
    score: F,
    budget: u64,
    preferred: &'a mut BTreeSet<usize>,
    report: ProbeReport,
}

impl LookaheadProbe {
    pub fn new(settings: LookaheadSettings) -> Self {
        let schedule = LookaheadSchedule::new(settings.frequency, settings.adapt_interval);
        let rng = settings.random_seed.map(ChaCha8Rng::seed_from_u64);
        Self {
            settings,
            schedule,
            visited: HashSet::new(),
            rng,
        }
    }

    pub fn settings(&self) -> &LookaheadSettings {
        &self.settings
    }

    /// Consults the schedule for evaluation number `evaluation`.
    pub fn should_probe(&mut self, evaluation: u64) -> bool {
        self.schedule.should_probe(evaluation)
    }

    /// Runs one probe session from `state`, whose own score is `cost`.
    ///
    /// `score` maps a successor to its raw oracle score. Failures skip the
    /// successor. Only operators applicable in `state` are ever added to
    /// `preferred`: an improvement found deeper marks the first operator of
    /// its path.
    pub fn run<F>(
        &mut self,
        task: &PlanningTask,
        state: &State,
        cost: f64,
        score: F,
        preferred: &mut BTreeSet<usize>,
    ) -> ProbeReport
    where
        F: FnMut(&State) -> Result<f64, OracleEvalError>,
    {
        self.visited.clear();
        let before = preferred.len();
        let mut session = Session {
            task,
            score,
            budget: self.settings.budget,
            preferred,
            report: ProbeReport::default(),
        };

        self.descend(&mut session, state, normalize_score(cost), self.settings.depth, None);

        let mut report = session.report;
        report.budget_left = session.budget;
        report.marked = session.preferred.len() - before;
        debug!(
            event = "lookahead_probe",
            scored = report.scored,
            failures = report.failures,
            budget_left = report.budget_left,
            marked = report.marked,
        );
        report
    }

    fn descend<F>(
        &mut self,
        session: &mut Session<'_, F>,
        state: &State,
        cost: f64,
        depth: usize,
        root_action: Option<usize>,
    ) where
        F: FnMut(&State) -> Result<f64, OracleEvalError>,
    {
        if depth == 0 || session.budget == 0 {
            return;
        }
        if self.visited.len() >= self.settings.visited_capacity {
            self.visited.clear();
        }
        if !self.visited.insert(state.fingerprint()) {
            return;
        }

        let mut operators: Vec<usize> = session.task.applicable_operators(state).collect();
        if let Some(rng) = self.rng.as_mut() {
            operators.shuffle(rng);
        }

        let bound = cost * self.settings.improvement_threshold;
        let mut candidates: Vec<(f64, usize, State)> = Vec::new();
        for op in operators {
            if session.budget == 0 {
                break;
            }
            session.budget -= 1;

            let successor = session.task.apply(op, state);
            match (session.score)(&successor) {
                Ok(raw) => {
                    session.report.scored += 1;
                    let score = normalize_score(raw);
                    if score < bound {
                        candidates.push((score, op, successor));
                    }
                }
                Err(err) => {
                    session.report.failures += 1;
                    debug!(event = "lookahead_oracle_failure", operator = op, error = %err);
                }
            }
        }

        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        candidates.truncate(self.settings.width);

        for &(_, op, _) in &candidates {
            session.preferred.insert(root_action.unwrap_or(op));
        }
        for (score, op, successor) in candidates {
            self.descend(session, &successor, score, depth - 1, Some(root_action.unwrap_or(op)));
        }
    }
}
