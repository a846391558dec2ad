//! Shared test fixtures for AntPlan crates.
//!
//! This crate provides small, hand-checkable planning tasks.
//! It does NOT depend on `antplan-heuristic` to avoid circular dependencies.
//!
//! - [`switches`] - two binary switches, the second gated by the first
//! - [`chain`] - a linear chain of binary variables
//! - [`gripper`] - a one-handed gripper robot moving balls between rooms
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! antplan-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```
//! use antplan_test::switches::{switches, SET_A, SET_B};
//!
//! let task = switches();
//! assert_eq!(task.operator(SET_A).name, "set_A");
//! assert_eq!(task.operator(SET_B).name, "set_B");
//! ```

pub mod chain;
pub mod gripper;
pub mod switches;

pub use chain::chain;
pub use gripper::gripper;
pub use switches::{switches, unreachable_switches};
