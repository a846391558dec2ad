//! Oracle backed by a Python callable.

// Allow deprecated pyo3 APIs (`with_gil`) until we move to the attach API
#![allow(deprecated)]

use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyModule, PyString};
use tracing::debug;

use super::{Oracle, OracleBinding, OracleEvalError, OracleInitError, Snapshot, SymbolTable};

/// Calls `resource.entry_point(state)` with `state` a `dict` of variable name
/// to fact name.
///
/// `resource` is a module name, or a path to a `.py` file whose directory is
/// added to `sys.path`. The interpreter lock is held for the whole call.
#[derive(Debug, Default)]
pub struct PythonOracle {
    resource: Option<String>,
    function: Option<Py<PyAny>>,
    tables: Option<InternedTables>,
}

/// Python strings for one [`SymbolTable`].
#[derive(Debug)]
struct InternedTables {
    table_id: u64,
    var_names: Vec<Py<PyString>>,
    fact_names: Vec<Vec<Py<PyString>>>,
}

impl InternedTables {
    fn new(py: Python<'_>, table: &SymbolTable) -> Self {
        let var_names = (0..table.num_variables())
            .map(|var| PyString::intern(py, table.var_name(var)).unbind())
            .collect();
        let fact_names = (0..table.num_variables())
            .map(|var| {
                table
                    .fact_names(var)
                    .iter()
                    .map(|name| PyString::intern(py, name).unbind())
                    .collect()
            })
            .collect();

        Self {
            table_id: table.id(),
            var_names,
            fact_names,
        }
    }
}

impl PythonOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module the oracle is bound to, once initialized.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }
}

impl Oracle for PythonOracle {
    fn ready(&self) -> bool {
        self.function.is_some()
    }

    fn initialize(&mut self, binding: &OracleBinding) -> Result<(), OracleInitError> {
        let resource = binding
            .resource
            .clone()
            .ok_or(OracleInitError::MissingResource)?;

        let (module_name, extra_path) = split_resource(&resource);
        let mut search_paths = binding.search_paths.clone();
        search_paths.extend(extra_path);

        pyo3::prepare_freethreaded_python();
        let function = Python::with_gil(|py| -> Result<Py<PyAny>, OracleInitError> {
            let unavailable = |err: PyErr| OracleInitError::ResourceUnavailable {
                resource: resource.clone(),
                reason: err.to_string(),
            };

            extend_sys_path(py, &search_paths).map_err(unavailable)?;
            let module = py.import(module_name.as_str()).map_err(unavailable)?;
            match module.getattr(binding.entry_point.as_str()) {
                Ok(function) if function.is_callable() => Ok(function.unbind()),
                _ => Err(OracleInitError::MissingEntryPoint {
                    resource: resource.clone(),
                    entry_point: binding.entry_point.clone(),
                    available: callable_names(&module),
                }),
            }
        })?;

        self.resource = Some(resource);
        self.function = Some(function);
        self.tables = None;
        Ok(())
    }

    fn score(&mut self, snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError> {
        let Self {
            function, tables, ..
        } = self;
        let function = function.as_ref().ok_or(OracleEvalError::NotReady)?;

        Python::with_gil(|py| {
            let table = snapshot.table();
            if tables.as_ref().is_some_and(|t| t.table_id != table.id()) {
                *tables = None;
            }
            let tables = tables.get_or_insert_with(|| InternedTables::new(py, table));

            call_entry_point(py, function, tables, snapshot).map_err(|err| {
                if let Some(traceback) = err.traceback(py) {
                    if let Ok(text) = traceback.format() {
                        debug!(event = "oracle_traceback", traceback = %text);
                    }
                }
                OracleEvalError::Faulted(err.to_string())
            })
        })
    }
}

fn call_entry_point(
    py: Python<'_>,
    function: &Py<PyAny>,
    tables: &InternedTables,
    snapshot: &Snapshot<'_>,
) -> PyResult<f64> {
    let state = PyDict::new(py);
    for (var, &value) in snapshot.values().iter().enumerate() {
        state.set_item(
            tables.var_names[var].bind(py),
            tables.fact_names[var][value].bind(py),
        )?;
    }

    let result = function.bind(py).call1((state,))?;
    // numpy and torch scalars
    let result = if result.hasattr("item")? {
        result.call_method0("item")?
    } else {
        result
    };
    result.extract::<f64>()
}

/// Splits `dir/name.py` into module `name` and search path `dir`.
fn split_resource(resource: &str) -> (String, Option<String>) {
    let path = Path::new(resource);
    if path.extension().is_some_and(|ext| ext == "py") {
        let module = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.to_string_lossy().into_owned());
        (module, dir)
    } else {
        (resource.to_string(), None)
    }
}

fn extend_sys_path(py: Python<'_>, paths: &[String]) -> PyResult<()> {
    let path_obj = py.import("sys")?.getattr("path")?;
    let sys_path = path_obj.downcast::<PyList>()?;
    for path in paths.iter().rev() {
        if !sys_path.contains(path.as_str())? {
            sys_path.insert(0, path.as_str())?;
        }
    }
    Ok(())
}

/// Public callables of a module, for the missing entry point hint.
fn callable_names(module: &Bound<'_, PyModule>) -> Vec<String> {
    let Ok(names) = module.dir() else {
        return Vec::new();
    };
    names
        .iter()
        .filter_map(|name| {
            let name: String = name.extract().ok()?;
            if name.starts_with('_') {
                return None;
            }
            let attr = module.getattr(name.as_str()).ok()?;
            attr.is_callable().then_some(name)
        })
        .collect()
}
