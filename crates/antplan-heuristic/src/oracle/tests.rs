//! Tests for snapshots, built-in oracles and the shared handle.

use std::collections::BTreeMap;

use antplan_test::gripper::{ball, gripper, HAND, ROBOT};
use antplan_test::switches::switches;

use super::*;

/// Fails initialization once, then succeeds.
#[derive(Debug, Default)]
struct FlakyInit {
    attempts: usize,
    ready: bool,
}

impl Oracle for FlakyInit {
    fn ready(&self) -> bool {
        self.ready
    }

    fn initialize(&mut self, binding: &OracleBinding) -> Result<(), OracleInitError> {
        self.attempts += 1;
        if self.attempts == 1 {
            return Err(OracleInitError::ResourceUnavailable {
                resource: binding.resource.clone().unwrap_or_default(),
                reason: "first attempt".to_string(),
            });
        }
        self.ready = true;
        Ok(())
    }

    fn score(&mut self, _snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError> {
        Ok(1.0)
    }
}

/// Initializes without error but never becomes ready.
#[derive(Debug)]
struct NeverReady;

impl Oracle for NeverReady {
    fn ready(&self) -> bool {
        false
    }

    fn initialize(&mut self, _binding: &OracleBinding) -> Result<(), OracleInitError> {
        Ok(())
    }

    fn score(&mut self, _snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError> {
        Ok(0.0)
    }
}

fn binding() -> OracleBinding {
    OracleBinding::new("oracle", "anticipatory_cost_fn")
}

#[test]
fn test_symbol_table_names() {
    let task = gripper(1);
    let table = SymbolTable::new(&task);

    assert_eq!(table.num_variables(), 3);
    assert_eq!(table.var_name(ROBOT), task.variables()[ROBOT].name);
    assert_eq!(table.fact_name(HAND, 0), task.variables()[HAND].fact_names[0]);
}

#[test]
fn test_symbol_table_ids_are_unique() {
    let task = switches();
    let a = SymbolTable::new(&task);
    let b = SymbolTable::new(&task);
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_snapshot_lookup() {
    let task = switches();
    let table = SymbolTable::new(&task);
    let values = [1, 0];
    let snapshot = Snapshot::new(&table, &values);

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("A"), Some("A=1"));
    assert_eq!(snapshot.get("B"), Some("B=0"));
    assert_eq!(snapshot.get("C"), None);

    let pairs: Vec<_> = snapshot.iter().collect();
    assert_eq!(pairs, vec![("A", "A=1"), ("B", "B=0")]);

    let expected: BTreeMap<String, String> = [("A", "A=1"), ("B", "B=0")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(snapshot.to_map(), expected);
}

#[test]
fn test_constant_oracle() {
    let task = switches();
    let table = SymbolTable::new(&task);
    let oracle = SharedOracle::new(ConstantOracle::new(5.0));
    oracle.ensure_ready(&binding()).unwrap();

    let score = oracle.score(&Snapshot::new(&table, &[0, 0])).unwrap();
    assert_eq!(score, 5.0);
}

#[test]
fn test_fn_oracle_sees_fact_names() {
    let task = gripper(2);
    let table = SymbolTable::new(&task);
    let oracle = SharedOracle::new(FnOracle::new(|snapshot: &Snapshot<'_>| {
        Ok(snapshot
            .iter()
            .filter(|(_, fact)| fact.ends_with("roomb"))
            .count() as f64)
    }));

    let mut values = task.initial_state().values().to_vec();
    assert_eq!(oracle.score(&Snapshot::new(&table, &values)).unwrap(), 0.0);

    values[ball(1)] = 1;
    assert_eq!(oracle.score(&Snapshot::new(&table, &values)).unwrap(), 1.0);
}

#[test]
fn test_ensure_ready_reports_init_error() {
    let oracle = SharedOracle::new(FlakyInit::default());

    let err = oracle.ensure_ready(&binding()).unwrap_err();
    assert!(matches!(err, OracleInitError::ResourceUnavailable { .. }));
    assert!(!oracle.is_ready());

    oracle.ensure_ready(&binding()).unwrap();
    assert!(oracle.is_ready());

    // Already ready: no third attempt.
    oracle.ensure_ready(&binding()).unwrap();
    assert_eq!(oracle.acquire().unwrap().attempts, 2);
}

#[test]
fn test_ensure_ready_incomplete() {
    let oracle = SharedOracle::new(NeverReady);
    assert_eq!(oracle.ensure_ready(&binding()), Err(OracleInitError::Incomplete));
}

#[test]
fn test_score_before_ready_is_rejected() {
    let task = switches();
    let table = SymbolTable::new(&task);
    let oracle = SharedOracle::new(FlakyInit::default());

    let err = oracle.score(&Snapshot::new(&table, &[0, 0])).unwrap_err();
    assert_eq!(err, OracleEvalError::NotReady);
}

#[test]
fn test_panic_is_caught_and_lock_released() {
    let task = switches();
    let table = SymbolTable::new(&task);
    let oracle = SharedOracle::new(FnOracle::new(|snapshot: &Snapshot<'_>| {
        if snapshot.get("A") == Some("A=1") {
            panic!("oracle blew up");
        }
        Ok(3.0)
    }));

    let err = oracle.score(&Snapshot::new(&table, &[1, 0])).unwrap_err();
    assert_eq!(err, OracleEvalError::Panicked("oracle blew up".to_string()));

    // The session released the lock cleanly.
    assert_eq!(oracle.score(&Snapshot::new(&table, &[0, 0])).unwrap(), 3.0);
}

#[test]
fn test_clones_share_one_oracle() {
    let oracle = SharedOracle::new(FlakyInit::default());
    let other = oracle.clone();
    assert_eq!(oracle.handle_count(), 2);

    let _ = oracle.ensure_ready(&binding());
    other.ensure_ready(&binding()).unwrap();
    assert!(oracle.is_ready());
}

/// Scores 1 when bound to `one`, 2 otherwise.
#[derive(Debug, Default)]
struct EntryScored {
    entry_point: Option<String>,
}

impl Oracle for EntryScored {
    fn ready(&self) -> bool {
        self.entry_point.is_some()
    }

    fn initialize(&mut self, binding: &OracleBinding) -> Result<(), OracleInitError> {
        self.entry_point = Some(binding.entry_point.clone());
        Ok(())
    }

    fn score(&mut self, _snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError> {
        Ok(if self.entry_point.as_deref() == Some("one") { 1.0 } else { 2.0 })
    }
}

#[test]
fn test_clone_cannot_rebind() {
    let oracle = SharedOracle::new(EntryScored::default());
    let other = oracle.clone();
    let one = OracleBinding::new("oracle", "one");
    let two = OracleBinding::new("oracle", "two");

    oracle.ensure_ready(&one).unwrap();
    assert_eq!(
        other.ensure_ready(&two),
        Err(OracleInitError::BindingConflict {
            active: one.clone(),
            requested: two,
        })
    );
    other.ensure_ready(&one).unwrap();
    assert_eq!(other.binding(), Some(one));

    let task = switches();
    let table = SymbolTable::new(&task);
    let snapshot = Snapshot::new(&table, task.initial_state().values());
    assert_eq!(other.score(&snapshot), Ok(1.0));
}

#[test]
fn test_fresh_handle_takes_new_binding() {
    let first = SharedOracle::new(EntryScored::default());
    first.ensure_ready(&OracleBinding::new("oracle", "one")).unwrap();

    let second = SharedOracle::new(EntryScored::default());
    second.ensure_ready(&OracleBinding::new("oracle", "two")).unwrap();

    let task = switches();
    let table = SymbolTable::new(&task);
    let snapshot = Snapshot::new(&table, task.initial_state().values());
    assert_eq!(second.score(&snapshot), Ok(2.0));
}

#[test]
fn test_preset_oracle_accepts_any_binding() {
    let oracle = SharedOracle::new(ConstantOracle::new(3.0));
    oracle.ensure_ready(&OracleBinding::new("a", "one")).unwrap();
    oracle.ensure_ready(&OracleBinding::new("b", "two")).unwrap();
    assert_eq!(oracle.binding(), None);
}

#[test]
fn test_missing_entry_point_message_lists_candidates() {
    let err = OracleInitError::MissingEntryPoint {
        resource: "oracle".to_string(),
        entry_point: "cost".to_string(),
        available: vec!["score".to_string(), "rank".to_string()],
    };
    assert_eq!(
        err.to_string(),
        "Entry point 'cost' not found in 'oracle' (available: score, rank)"
    );

    let err = OracleInitError::MissingEntryPoint {
        resource: "oracle".to_string(),
        entry_point: "cost".to_string(),
        available: Vec::new(),
    };
    assert!(err.to_string().ends_with("(available: none)"));
}
