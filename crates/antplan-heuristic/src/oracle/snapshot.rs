//! Symbolic state snapshots handed to oracles.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use antplan_core::PlanningTask;

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Interned variable and fact names of one task.
///
/// Built once per evaluator and reused for every snapshot. Each table gets a
/// process-unique id so oracles can cache their own conversions of it.
#[derive(Debug)]
pub struct SymbolTable {
    id: u64,
    var_names: Vec<Arc<str>>,
    fact_names: Vec<Vec<Arc<str>>>,
}

impl SymbolTable {
    pub fn new(task: &PlanningTask) -> Self {
        let var_names = task
            .variables()
            .iter()
            .map(|var| Arc::from(var.name.as_str()))
            .collect();
        let fact_names = task
            .variables()
            .iter()
            .map(|var| var.fact_names.iter().map(|f| Arc::from(f.as_str())).collect())
            .collect();

        Self {
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            var_names,
            fact_names,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.var_names.len()
    }

    #[inline]
    pub fn var_name(&self, var: usize) -> &str {
        &self.var_names[var]
    }

    #[inline]
    pub fn fact_name(&self, var: usize, value: usize) -> &str {
        &self.fact_names[var][value]
    }

    /// All fact names of one variable, indexed by value.
    pub fn fact_names(&self, var: usize) -> &[Arc<str>] {
        &self.fact_names[var]
    }
}

/// Read-only view of one assignment through a [`SymbolTable`].
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    table: &'a SymbolTable,
    values: &'a [usize],
}

impl<'a> Snapshot<'a> {
    pub fn new(table: &'a SymbolTable, values: &'a [usize]) -> Self {
        debug_assert_eq!(table.num_variables(), values.len());
        Self { table, values }
    }

    #[inline]
    pub fn table(&self) -> &'a SymbolTable {
        self.table
    }

    /// Raw value per variable.
    #[inline]
    pub fn values(&self) -> &'a [usize] {
        self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fact name currently held by the named variable.
    pub fn get(&self, var_name: &str) -> Option<&'a str> {
        let table = self.table;
        (0..table.num_variables())
            .find(|&var| table.var_name(var) == var_name)
            .map(|var| table.fact_name(var, self.values[var]))
    }

    /// Iterates `(variable name, fact name)` pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let table = self.table;
        self.values
            .iter()
            .enumerate()
            .map(move |(var, &value)| (table.var_name(var), table.fact_name(var, value)))
    }

    /// Copies the snapshot into an owned name-to-name map.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(var, fact)| (var.to_string(), fact.to_string()))
            .collect()
    }
}
