//! Reference-counted oracle handle with scoped exclusive access.

use std::any::Any;
use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info};

use super::{Oracle, OracleBinding, OracleEvalError, OracleInitError, Snapshot};

/// Shared, lazily initialized oracle.
///
/// Cloning the handle shares the same oracle. Every call goes through
/// [`SharedOracle::acquire`], which holds the lock for the lifetime of the
/// returned [`OracleSession`] and releases it on every exit path.
///
/// The first binding that initializes the oracle stays active for every
/// clone; binding to something else needs a new handle.
#[derive(Debug)]
pub struct SharedOracle<O: Oracle> {
    inner: Arc<Mutex<Slot<O>>>,
}

#[derive(Debug)]
struct Slot<O> {
    oracle: O,
    binding: Option<OracleBinding>,
}

impl<O: Oracle> Clone for SharedOracle<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: Oracle> SharedOracle<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Slot {
                oracle,
                binding: None,
            })),
        }
    }

    /// Initializes the oracle unless it is already ready.
    ///
    /// An oracle that is ready without ever being initialized accepts any
    /// binding.
    ///
    /// # Errors
    ///
    /// Returns [`OracleInitError::BindingConflict`] if the oracle was
    /// initialized with a different binding, the oracle's own
    /// [`OracleInitError`], [`OracleInitError::Poisoned`] if an earlier call
    /// panicked while holding the lock, or [`OracleInitError::Incomplete`] if
    /// the oracle still reports not ready.
    pub fn ensure_ready(&self, binding: &OracleBinding) -> Result<(), OracleInitError> {
        let mut slot = self.inner.lock().map_err(|_| OracleInitError::Poisoned)?;
        if let Some(active) = &slot.binding {
            if active != binding {
                error!(event = "oracle_rebind_rejected", active = %active, requested = %binding);
                return Err(OracleInitError::BindingConflict {
                    active: active.clone(),
                    requested: binding.clone(),
                });
            }
        }
        if slot.oracle.ready() {
            return Ok(());
        }

        info!(event = "oracle_bind", binding = %binding);
        if let Err(err) = slot.oracle.initialize(binding) {
            error!(event = "oracle_bind_failed", binding = %binding, error = %err);
            return Err(err);
        }
        if !slot.oracle.ready() {
            error!(event = "oracle_bind_failed", binding = %binding, error = "not ready");
            return Err(OracleInitError::Incomplete);
        }
        slot.binding = Some(binding.clone());
        Ok(())
    }

    /// Binding the oracle was initialized with, if any.
    pub fn binding(&self) -> Option<OracleBinding> {
        self.inner.lock().ok().and_then(|slot| slot.binding.clone())
    }

    /// Returns true if the oracle is initialized and the lock is healthy.
    pub fn is_ready(&self) -> bool {
        self.inner.lock().map(|slot| slot.oracle.ready()).unwrap_or(false)
    }

    /// Takes exclusive access for a series of calls.
    pub fn acquire(&self) -> Result<OracleSession<'_, O>, OracleEvalError> {
        let guard = self.inner.lock().map_err(|_| OracleEvalError::Poisoned)?;
        Ok(OracleSession { guard })
    }

    /// Scores one snapshot under a short-lived session.
    pub fn score(&self, snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError> {
        self.acquire()?.score(snapshot)
    }

    /// Number of live handles sharing this oracle.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

/// Exclusive access to the oracle; the lock is released on drop.
#[derive(Debug)]
pub struct OracleSession<'a, O: Oracle> {
    guard: MutexGuard<'a, Slot<O>>,
}

impl<O: Oracle> OracleSession<'_, O> {
    /// Scores one snapshot.
    ///
    /// A panic inside the oracle is caught and reported as
    /// [`OracleEvalError::Panicked`]; it never reaches the caller.
    pub fn score(&mut self, snapshot: &Snapshot<'_>) -> Result<f64, OracleEvalError> {
        let oracle = &mut self.guard.oracle;
        if !oracle.ready() {
            return Err(OracleEvalError::NotReady);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| oracle.score(snapshot))) {
            Ok(result) => result,
            Err(payload) => Err(OracleEvalError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

impl<O: Oracle> Deref for OracleSession<'_, O> {
    type Target = O;

    fn deref(&self) -> &O {
        &self.guard.oracle
    }
}

impl<O: Oracle> DerefMut for OracleSession<'_, O> {
    fn deref_mut(&mut self) -> &mut O {
        &mut self.guard.oracle
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
