//! Provide the shared vocabulary every phasekit test package is written against.
//!
//! A test package implements [`TestCase`]: it prepares and releases per-phase state, produces a [`Vector`] of
//! parameters for the current phase, and runs one case at a time against a [`FailureSink`].
//!
//! ## Notes
//!
//! - This crate has **no IO** beyond the standalone sink's stderr report, and no logging or CLI dependencies.
//!   Orchestration (phase replay, baselines, suites, reporting) lives in the `phasekit` crate.
//! - Vectors are not length-aware: `params(id)` returning `None` is the only termination signal.

pub mod contract;
pub mod sink;
pub mod vector;

pub use contract::{CaseError, TestCase};
pub use sink::{FailureSink, Recorder, check, check_eq, require, require_eq, require_ok};
pub use vector::{Array, Vector, vector_params};
