//! Tests for evaluator configuration.

use super::*;

#[test]
fn test_defaults() {
    let config = EvaluatorConfig::default();
    assert_eq!(config.entry_point, "anticipatory_cost_fn");
    assert!(config.enable_cache);
    assert_eq!(config.cache_capacity, 500_000);
    assert!(!config.enable_lookahead);
    assert_eq!(config.compute_relaxed_distance_variant, RelaxedDistanceVariant::Max);
    assert_eq!(config.composition, Composition::OracleOnly);
    assert_eq!(config.on_oracle_error, OracleFailurePolicy::Zero);
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_parsing() {
    let toml = r#"
        oracle_resource = "antplan.scripts.eval_gripper"
        entry_point = "cost"
        search_paths = [".", "scripts"]
        enable_cache = false
        compute_relaxed_distance_variant = "max_propagation"
        composition = "frontier_min"
        frontier_limit = 16
        on_oracle_error = "dead_end"

        enable_lookahead = true
        lookahead_frequency = 5
        lookahead_depth = 3
        lookahead_budget = 100
        improvement_threshold = 0.75
    "#;

    let config = EvaluatorConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.oracle_resource.as_deref(), Some("antplan.scripts.eval_gripper"));
    assert_eq!(config.entry_point, "cost");
    assert_eq!(config.search_paths, vec![".", "scripts"]);
    assert!(!config.enable_cache);
    assert_eq!(config.compute_relaxed_distance_variant, RelaxedDistanceVariant::Max);
    assert_eq!(config.composition, Composition::FrontierMin);
    assert_eq!(config.frontier_limit, Some(16));
    assert_eq!(config.on_oracle_error, OracleFailurePolicy::DeadEnd);
    assert_eq!(config.lookahead_depth, 3);
    assert_eq!(config.lookahead_budget, 100);
    // Unset knobs keep their defaults
    assert_eq!(config.lookahead_width, 3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        oracle_resource: pkg.module
        compute_relaxed_distance_variant: additive_propagation
        composition: sum
        cache_capacity: 10
    "#;

    let config = EvaluatorConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.compute_relaxed_distance_variant, RelaxedDistanceVariant::Additive);
    assert_eq!(config.composition, Composition::Sum);
    assert_eq!(config.cache_capacity, 10);
}

#[test]
fn test_unknown_variant_rejected() {
    let result = EvaluatorConfig::from_toml_str(r#"composition = "product""#);
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_builder() {
    let config = EvaluatorConfig::new()
        .with_oracle("pkg.mod", "score")
        .with_cache_capacity(1)
        .with_composition(Composition::Sum)
        .with_lookahead(4, 2, 32)
        .with_random_seed(7);

    assert_eq!(config.oracle_binding(), OracleBinding::new("pkg.mod", "score").with_search_path("."));
    assert_eq!(config.cache_capacity, 1);
    assert!(config.enable_lookahead);
    assert_eq!(config.random_seed, Some(7));
    assert!(config.validate().is_ok());
}

#[test]
fn test_threshold_out_of_range() {
    let mut config = EvaluatorConfig::new();
    config.improvement_threshold = 0.0;
    assert!(config.validate().is_err());
    config.improvement_threshold = 1.5;
    assert!(config.validate().is_err());
    config.improvement_threshold = f64::NAN;
    assert!(config.validate().is_err());
    config.improvement_threshold = 1.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_relaxed_composition_needs_variant() {
    let config = EvaluatorConfig::new()
        .with_relaxed_distance(RelaxedDistanceVariant::None)
        .with_composition(Composition::RelaxedOnly);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("relaxed_only"));

    let oracle_only = EvaluatorConfig::new()
        .with_relaxed_distance(RelaxedDistanceVariant::None)
        .with_composition(Composition::OracleOnly);
    assert!(oracle_only.validate().is_ok());
}

#[test]
fn test_lookahead_knobs_must_be_positive() {
    let config = EvaluatorConfig::new().with_lookahead(10, 0, 64);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("lookahead_depth"));

    // Zero knobs are fine while the probe is off
    let mut disabled = EvaluatorConfig::new();
    disabled.lookahead_budget = 0;
    assert!(disabled.validate().is_ok());
}

#[test]
fn test_needs_oracle() {
    let relaxed = EvaluatorConfig::new().with_composition(Composition::RelaxedOnly);
    assert!(!relaxed.needs_oracle());
    assert!(relaxed.clone().with_lookahead(1, 1, 1).needs_oracle());
    assert!(EvaluatorConfig::new().needs_oracle());
}

#[test]
fn test_binding_display() {
    assert_eq!(OracleBinding::new("pkg.mod", "f").to_string(), "pkg.mod:f");
    assert_eq!(OracleBinding::default().to_string(), "<none>:");
}

#[test]
fn test_load_picks_format_by_extension() {
    let dir = std::env::temp_dir().join(format!("antplan-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let yaml = dir.join("evaluator.yaml");
    std::fs::write(&yaml, "composition: frontier_min\nfrontier_limit: 8\n").unwrap();
    let config = EvaluatorConfig::load(&yaml).unwrap();
    assert_eq!(config.composition, Composition::FrontierMin);
    assert_eq!(config.frontier_limit, Some(8));

    let toml = dir.join("evaluator.toml");
    std::fs::write(&toml, "composition = \"sum\"\n").unwrap();
    assert_eq!(EvaluatorConfig::load(&toml).unwrap().composition, Composition::Sum);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_missing_file() {
    let err = EvaluatorConfig::load("does/not/exist.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
