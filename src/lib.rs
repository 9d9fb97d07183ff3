#![forbid(unsafe_code)]
//! Phasekit: phase-ordered, table-driven test orchestration
//!
//! A [`Suite`] holds named [`Package`]s. Each package wraps a [`TestCase`] implementation, runs it through an
//! ordered set of phases, and drives every phase with a vector of parameterized cases. A package can freeze its
//! vectors into baseline files so later runs replay exactly the approved cases.
//!
//! Two execution paths exist:
//!
//! - **Standalone** ([`Suite::run`], [`Suite::run_all`], [`Package::update_baseline`]): fail-fast. The first setup,
//!   teardown, baseline, or case failure aborts the operation.
//! - **Framework** ([`runner::run_suite`]): every case is an isolated sub-test and each failure carries a command
//!   that reproduces it on its own.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **Test cases**: panics inside a case are caught by the framework runner and reported as that case's failure.

pub mod baseline;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod package;
pub mod runner;
pub mod suite;

pub use config::{FailCommands, RunConfig};
pub use error::{ErrorKind, HarnessError, Result};
pub use package::Package;
pub use runner::{ConsoleReporter, Reporter, RunSummary, run_suite};
pub use suite::{AnyPackage, Suite, TestRef};

pub use phasekit_core::{Array, CaseError, FailureSink, Recorder, TestCase, Vector, vector_params};
