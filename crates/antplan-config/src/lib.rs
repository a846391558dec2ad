//! Configuration system for AntPlan.
//!
//! Load evaluator configuration from TOML or YAML to choose the relaxed
//! distance, the oracle binding, the composition strategy and the lookahead
//! probe without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use antplan_config::{Composition, EvaluatorConfig, RelaxedDistanceVariant};
//!
//! let config = EvaluatorConfig::from_toml_str(r#"
//!     oracle_resource = "antplan.scripts.eval_gripper"
//!     compute_relaxed_distance_variant = "additive"
//!     composition = "sum"
//!     cache_capacity = 1000
//!
//!     enable_lookahead = true
//!     lookahead_depth = 3
//! "#).unwrap();
//!
//! assert_eq!(config.entry_point, "anticipatory_cost_fn");
//! assert_eq!(config.compute_relaxed_distance_variant, RelaxedDistanceVariant::Additive);
//! assert_eq!(config.composition, Composition::Sum);
//! assert!(config.validate().is_ok());
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use antplan_config::EvaluatorConfig;
//!
//! let config = EvaluatorConfig::load("antplan.toml").unwrap_or_default();
//! assert!(config.enable_cache);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default oracle entry point name.
pub const DEFAULT_ENTRY_POINT: &str = "anticipatory_cost_fn";

/// Heuristic evaluator configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EvaluatorConfig {
    /// Resource the oracle loads (module path, script file).
    pub oracle_resource: Option<String>,

    /// Entry point inside the oracle resource.
    pub entry_point: String,

    /// Extra lookup paths for the oracle resource.
    pub search_paths: Vec<String>,

    /// Memoize composed values by state fingerprint.
    pub enable_cache: bool,

    /// Entry count that triggers a full cache clear.
    pub cache_capacity: usize,

    /// Run the bounded lookahead probe.
    pub enable_lookahead: bool,

    /// Probe once every this many evaluations.
    pub lookahead_frequency: u64,

    /// Evaluations after which the probe frequency is stretched by one step.
    pub lookahead_adapt_interval: Option<u64>,

    /// Maximum probe recursion depth.
    pub lookahead_depth: usize,

    /// Maximum successor evaluations per probe session.
    pub lookahead_budget: u64,

    /// Improving successors marked and recursed into per probed state.
    pub lookahead_width: usize,

    /// Visited fingerprints kept per probe session before a full clear.
    pub lookahead_visited_capacity: usize,

    /// A successor improves when `score < current * improvement_threshold`.
    pub improvement_threshold: f64,

    /// Relaxed reachability propagation.
    pub compute_relaxed_distance_variant: RelaxedDistanceVariant,

    /// How relaxed distance and oracle score become the returned value.
    pub composition: Composition,

    /// Maximum frontier nodes scored by [`Composition::FrontierMin`].
    pub frontier_limit: Option<usize>,

    /// Fallback used when the oracle faults while scoring.
    pub on_oracle_error: OracleFailurePolicy,

    /// Seed for shuffling probe candidates.
    pub random_seed: Option<u64>,

    /// Trace every evaluated state's facts (very slow).
    pub log_states: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            oracle_resource: None,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            search_paths: vec![".".to_string()],
            enable_cache: true,
            cache_capacity: 500_000,
            enable_lookahead: false,
            lookahead_frequency: 10,
            lookahead_adapt_interval: None,
            lookahead_depth: 2,
            lookahead_budget: 64,
            lookahead_width: 3,
            lookahead_visited_capacity: 100_000,
            improvement_threshold: 0.9,
            compute_relaxed_distance_variant: RelaxedDistanceVariant::Max,
            composition: Composition::OracleOnly,
            frontier_limit: None,
            on_oracle_error: OracleFailurePolicy::Zero,
            random_seed: None,
            log_states: false,
        }
    }
}

impl EvaluatorConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, YAML for `.yaml`/`.yml`, TOML otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Binds the oracle to a resource and entry point.
    pub fn with_oracle(mut self, resource: impl Into<String>, entry_point: impl Into<String>) -> Self {
        self.oracle_resource = Some(resource.into());
        self.entry_point = entry_point.into();
        self
    }

    /// Enables or disables the memoization cache.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.enable_cache = enabled;
        self
    }

    /// Sets the cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Sets the relaxed propagation variant.
    pub fn with_relaxed_distance(mut self, variant: RelaxedDistanceVariant) -> Self {
        self.compute_relaxed_distance_variant = variant;
        self
    }

    /// Sets the composition strategy.
    pub fn with_composition(mut self, composition: Composition) -> Self {
        self.composition = composition;
        self
    }

    /// Sets the oracle failure fallback.
    pub fn with_oracle_failure_policy(mut self, policy: OracleFailurePolicy) -> Self {
        self.on_oracle_error = policy;
        self
    }

    /// Enables the lookahead probe.
    pub fn with_lookahead(mut self, frequency: u64, depth: usize, budget: u64) -> Self {
        self.enable_lookahead = true;
        self.lookahead_frequency = frequency;
        self.lookahead_depth = depth;
        self.lookahead_budget = budget;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Returns the oracle binding described by this configuration.
    pub fn oracle_binding(&self) -> OracleBinding {
        OracleBinding {
            resource: self.oracle_resource.clone(),
            entry_point: self.entry_point.clone(),
            search_paths: self.search_paths.clone(),
        }
    }

    /// Returns true if evaluation consults the oracle at all.
    pub fn needs_oracle(&self) -> bool {
        self.composition != Composition::RelaxedOnly || self.enable_lookahead
    }

    /// Checks option combinations that deserialization cannot express.
    ///
    /// # Examples
    ///
    /// ```
    /// use antplan_config::{Composition, EvaluatorConfig, RelaxedDistanceVariant};
    ///
    /// let config = EvaluatorConfig::new()
    ///     .with_relaxed_distance(RelaxedDistanceVariant::None)
    ///     .with_composition(Composition::Sum);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.improvement_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "improvement_threshold must be in (0, 1], got {threshold}"
            )));
        }

        if self.composition.uses_relaxed_distance()
            && self.compute_relaxed_distance_variant == RelaxedDistanceVariant::None
        {
            return Err(ConfigError::Invalid(format!(
                "composition '{}' needs a relaxed distance variant other than 'none'",
                self.composition
            )));
        }

        if self.entry_point.is_empty() {
            return Err(ConfigError::Invalid("entry_point must not be empty".to_string()));
        }

        if self.enable_lookahead {
            let knobs = [
                ("lookahead_frequency", self.lookahead_frequency),
                ("lookahead_depth", self.lookahead_depth as u64),
                ("lookahead_budget", self.lookahead_budget),
                ("lookahead_width", self.lookahead_width as u64),
            ];
            if let Some((name, _)) = knobs.iter().find(|(_, value)| *value == 0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be at least 1 when lookahead is enabled"
                )));
            }
        }

        if self.lookahead_adapt_interval == Some(0) {
            return Err(ConfigError::Invalid(
                "lookahead_adapt_interval must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Resource and entry point an oracle binds to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OracleBinding {
    /// Resource to load; `None` for oracles that need nothing external.
    pub resource: Option<String>,

    /// Entry point inside the resource.
    pub entry_point: String,

    /// Extra lookup paths, searched before the defaults.
    #[serde(default)]
    pub search_paths: Vec<String>,
}

impl OracleBinding {
    pub fn new(resource: impl Into<String>, entry_point: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
            entry_point: entry_point.into(),
            search_paths: Vec::new(),
        }
    }

    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_paths.push(path.into());
        self
    }
}

impl std::fmt::Display for OracleBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}:{}", resource, self.entry_point),
            None => write!(f, "<none>:{}", self.entry_point),
        }
    }
}

/// Relaxed reachability propagation variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxedDistanceVariant {
    /// Skip relaxed reachability entirely.
    None,

    /// Operator cost is the max over preconditions (admissible).
    #[default]
    #[serde(alias = "max_propagation", alias = "hmax")]
    Max,

    /// Operator cost is the sum over preconditions.
    #[serde(alias = "additive_propagation", alias = "hadd")]
    Additive,
}

impl std::fmt::Display for RelaxedDistanceVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelaxedDistanceVariant::None => write!(f, "none"),
            RelaxedDistanceVariant::Max => write!(f, "max"),
            RelaxedDistanceVariant::Additive => write!(f, "additive"),
        }
    }
}

/// Composition of relaxed distance and oracle score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Composition {
    /// Relaxed distance alone.
    RelaxedOnly,

    /// Oracle score of the evaluated state alone.
    #[default]
    OracleOnly,

    /// Relaxed distance plus oracle score.
    Sum,

    /// Minimum of relaxed distance to a frontier node plus its oracle score.
    FrontierMin,
}

impl Composition {
    /// Returns true if this strategy reads the relaxed distance.
    pub fn uses_relaxed_distance(self) -> bool {
        !matches!(self, Composition::OracleOnly)
    }
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Composition::RelaxedOnly => write!(f, "relaxed_only"),
            Composition::OracleOnly => write!(f, "oracle_only"),
            Composition::Sum => write!(f, "sum"),
            Composition::FrontierMin => write!(f, "frontier_min"),
        }
    }
}

/// Value substituted when the oracle faults while scoring a state.
///
/// `Zero` is optimistic and keeps search going on states the oracle could
/// not judge. `DeadEnd` is pessimistic and prunes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleFailurePolicy {
    #[default]
    Zero,
    DeadEnd,
}

#[cfg(test)]
mod tests;
