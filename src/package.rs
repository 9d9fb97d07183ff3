//! Packages: a named test implementation plus its phase count and optional baseline.
//!
//! ## Phase model
//!
//! Phases are cumulative prerequisites. Reaching phase `k` in isolation replays the full setup/teardown cycle of
//! every phase `0..k` in order, then sets up `k` and leaves it open. Replay always starts from phase 0, so lifecycle
//! call counts are predictable: `Setup(0), Teardown(0), ..., Setup(k)`.
//!
//! ## Failure handling
//!
//! On this (standalone) path every error is fatal to the current operation: a failing setup, case, or teardown
//! aborts the remaining cases and phases. The framework runner in [`crate::runner`] isolates cases instead.

use std::fmt;
use std::path::{Path, PathBuf};

use phasekit_core::{Recorder, TestCase, Vector, vector_params};
use tracing::{debug, info, warn};

use crate::baseline::{self, BaselineStore};
use crate::error::{HarnessError, Result};

/// A runnable test unit.
pub struct Package<T: TestCase> {
    name: String,
    test: T,
    phases: usize,
    baseline: bool,
    dir: PathBuf,
}

impl<T: TestCase> Package<T> {
    /// A package with one implicit phase, no baseline, and the current directory as data root.
    pub fn new(name: impl Into<String>, test: T) -> Self {
        Self {
            name: name.into(),
            test,
            phases: 0,
            baseline: false,
            dir: PathBuf::from("."),
        }
    }

    /// Declare `phases` phases; 0 means one implicit phase.
    pub fn with_phases(mut self, phases: usize) -> Self {
        self.phases = phases;
        self
    }

    /// Drive execution from stored baselines instead of the live vector.
    pub fn with_baseline(mut self) -> Self {
        self.baseline = true;
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn set_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dir = dir.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured phase count, as given (may be 0).
    pub fn phases(&self) -> usize {
        self.phases
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline
    }

    pub fn test(&self) -> &T {
        &self.test
    }

    pub fn test_mut(&mut self) -> &mut T {
        &mut self.test
    }

    pub fn is_long(&self) -> bool {
        self.test.is_long()
    }

    pub fn num_phases(&self) -> usize {
        self.phases.max(1)
    }

    /// Validate `phase` against `[0, num_phases())`.
    pub fn check_phase(&self, phase: i64) -> Result<usize> {
        let n = self.num_phases();
        match usize::try_from(phase) {
            Ok(p) if p < n => Ok(p),
            _ => Err(HarnessError::PhaseOutOfRange {
                package: self.name.clone(),
                phase,
                phases: n,
            }),
        }
    }

    /// The live vector, straight from the test implementation.
    pub fn pre_vector(&self) -> T::Vector {
        self.test.vector()
    }

    /// The vector that drives execution of `phase`: the stored baseline when enabled, else the live vector.
    pub fn post_vector(&self, phase: usize) -> Result<T::Vector> {
        match self.baseline_path(phase) {
            Some(path) => self.store().load(&path),
            None => Ok(self.pre_vector()),
        }
    }

    /// Where `phase`'s baseline lives, or `None` if the package does not use one.
    pub fn baseline_path(&self, phase: usize) -> Option<PathBuf> {
        self.baseline.then(|| self.store().path(&self.name, phase))
    }

    fn store(&self) -> BaselineStore {
        BaselineStore::new(self.dir())
    }

    /// Resolve case `id` of `phase` from the post-baseline vector.
    pub fn lookup_params(&self, phase: usize, id: i64) -> Result<T::Params> {
        let vector = self.post_vector(phase)?;
        usize::try_from(id)
            .ok()
            .and_then(|id| vector.params(id))
            .ok_or_else(|| HarnessError::CaseNotFound {
                package: self.name.clone(),
                id,
            })
    }

    /// Run every phase before `target` through setup and teardown, then set up `target` and leave it open.
    pub fn setup_phase(&mut self, target: usize) -> Result<()> {
        for phase in 0..target {
            self.setup(phase)?;
            self.teardown(phase)?;
        }
        self.setup(target)
    }

    /// Run one case in isolation: validate, replay phases up to `phase`, run, tear down.
    #[tracing::instrument(skip_all, fields(package = %self.name, phase = phase, id = id))]
    pub fn run(&mut self, phase: i64, id: usize, params: &T::Params) -> Result<()> {
        let phase = self.check_phase(phase)?;
        self.setup_phase(phase)?;
        self.run_test(phase, id, params)?;
        self.teardown(phase)
    }

    /// Run one phase's whole post-baseline vector in isolation, replaying earlier phases first.
    #[tracing::instrument(skip_all, fields(package = %self.name, phase = phase))]
    pub fn run_phase(&mut self, phase: i64) -> Result<()> {
        let phase = self.check_phase(phase)?;
        self.setup_phase(phase)?;
        let vector = self.post_vector(phase)?;
        for (id, params) in vector_params(&vector).iter().enumerate() {
            self.run_test(phase, id, params)?;
        }
        self.teardown(phase)
    }

    /// Set up `phase` once, run every case in order, tear down once. An empty vector is skipped entirely.
    #[tracing::instrument(skip_all, fields(package = %self.name, phase = phase, cases = vector.len()))]
    pub fn run_vector(&mut self, vector: &[T::Params], phase: usize) -> Result<()> {
        if vector.is_empty() {
            warn!(package = %self.name, phase, "empty test vector... skipping");
            return Ok(());
        }
        self.setup(phase)?;
        for (id, params) in vector.iter().enumerate() {
            self.run_test(phase, id, params)?;
        }
        self.teardown(phase)
    }

    /// Re-validate and refresh every phase's stored baseline from the live vector.
    ///
    /// For each phase in order: compute the live vector, run all of its cases, then rewrite the stored artifact if
    /// its encoding differs (or it does not exist yet). The first error stops the update; earlier phases keep
    /// whatever was written for them.
    #[tracing::instrument(skip_all, fields(package = %self.name))]
    pub fn update_baseline(&mut self) -> Result<()> {
        if !self.baseline {
            return Err(HarnessError::NoBaseline {
                package: self.name.clone(),
            });
        }
        let store = self.store();
        for phase in 0..self.num_phases() {
            let vector = self.pre_vector();
            self.run_vector(&vector_params(&vector), phase)?;

            let path = store.path(&self.name, phase);
            let fresh = baseline::encode(&path, &vector)?;
            baseline::verify_round_trip(&path, &vector, &fresh)?;
            if let Some(current) = store.try_load::<T::Vector>(&path)? {
                if baseline::encode(&path, &current)? == fresh {
                    info!(path = %path.display(), "baseline unchanged (file not modified)");
                    continue;
                }
            }
            store.save(&path, &vector)?;
            info!(path = %path.display(), "baseline updated");
        }
        Ok(())
    }

    pub(crate) fn setup(&mut self, phase: usize) -> Result<()> {
        info!(package = %self.name, phase, "setup phase");
        self.test.setup(phase).map_err(|source| HarnessError::Setup {
            package: self.name.clone(),
            phase,
            source,
        })
    }

    pub(crate) fn teardown(&mut self, phase: usize) -> Result<()> {
        info!(package = %self.name, phase, "teardown phase");
        self.test.teardown(phase).map_err(|source| HarnessError::Teardown {
            package: self.name.clone(),
            phase,
            source,
        })
    }

    fn run_test(&mut self, phase: usize, id: usize, params: &T::Params) -> Result<()> {
        debug!(package = %self.name, phase, id, "running test");
        let mut recorder = Recorder::new();
        self.test.run(&mut recorder, params);
        recorder.into_result().map_err(|message| HarnessError::CaseFailed {
            package: self.name.clone(),
            phase,
            id,
            message,
        })
    }
}

impl<T: TestCase> fmt::Debug for Package<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field("name", &self.name)
            .field("phases", &self.phases)
            .field("baseline", &self.baseline)
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}
