//! AntPlan Core - finite-domain planning task model
//!
//! This crate provides the inputs every AntPlan heuristic works on:
//! - Variables with named facts, one per domain value
//! - Operators with preconditions and (conditional) effects
//! - States as full assignments, with a cheap fingerprint
//! - Task validation so heuristics can index without bounds surprises

pub mod error;
pub mod state;
pub mod task;


pub use error::{Result, TaskError};
pub use state::{State, StateFingerprint};
pub use task::{Effect, FactPair, Operator, PlanningTask, Variable};
