//! The capability set every test package implements.

use std::error::Error;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::sink::FailureSink;
use crate::vector::Vector;

/// Error returned by `setup`/`teardown` hooks.
pub type CaseError = Box<dyn Error + Send + Sync + 'static>;

/// A table-driven test implementation.
///
/// ## Lifecycle
///
/// For each phase reached in a run: `setup(phase)` once, then `run` for every case of that phase in index order,
/// then `teardown(phase)` once. Phases are cumulative: phase `n` may rely on phases `0..n` having been set up and
/// torn down, in order, on the same value.
///
/// ## Notes
/// - `run` reports failures through the sink instead of returning them.
/// - `vector` describes the *current* phase context. Its output must be deterministic given the preceding lifecycle
///   calls, unless the package persists a baseline, in which case it only seeds and refreshes that baseline.
pub trait TestCase {
    /// One case's input.
    type Params: fmt::Debug;

    /// The vector type; its encoding is the baseline format.
    type Vector: Vector<Params = Self::Params> + Serialize + DeserializeOwned + PartialEq + fmt::Debug;

    /// Prepare state for `phase`.
    fn setup(&mut self, phase: usize) -> Result<(), CaseError>;

    /// Produce the live (pre-baseline) vector for the current phase context.
    fn vector(&self) -> Self::Vector;

    /// Execute one case.
    fn run(&mut self, sink: &mut dyn FailureSink, params: &Self::Params);

    /// Release state for `phase`. No-op unless overridden.
    fn teardown(&mut self, _phase: usize) -> Result<(), CaseError> {
        Ok(())
    }

    /// `true` if the package should be skipped in a short run.
    fn is_long(&self) -> bool {
        false
    }
}
