//! Suites: ordered collections of packages addressable by name.
//!
//! Packages in one suite usually have different [`TestCase`] types, so the suite stores them behind the
//! object-safe [`AnyPackage`] trait. Lookup is a linear scan by name; with duplicate names the first match wins.

use std::path::Path;

use phasekit_core::TestCase;

use crate::error::{HarnessError, Result};
use crate::package::Package;
use crate::runner::{self, RunContext};

/// Type-erased view of a [`Package`].
pub trait AnyPackage {
    fn name(&self) -> &str;

    fn num_phases(&self) -> usize;

    fn is_long(&self) -> bool;

    fn has_baseline(&self) -> bool;

    fn set_dir(&mut self, dir: &Path);

    fn check_phase(&self, phase: i64) -> Result<usize>;

    /// Debug rendering of case `id`'s params in the post-baseline vector of `phase`.
    fn describe_case(&self, phase: usize, id: i64) -> Result<String>;

    /// Resolve case `id` of `phase` and run it in isolation, replaying earlier phases.
    fn run_case(&mut self, phase: i64, id: i64) -> Result<()>;

    /// Run one phase's whole vector in isolation, replaying earlier phases.
    fn run_phase(&mut self, phase: i64) -> Result<()>;

    /// Run every phase end to end from its post-baseline vector.
    fn run_all(&mut self) -> Result<()>;

    fn update_baseline(&mut self) -> Result<()>;

    /// Drive all phases through the framework runner.
    fn run_framework(&mut self, ctx: &mut RunContext<'_>);
}

impl<T: TestCase> AnyPackage for Package<T> {
    fn name(&self) -> &str {
        Package::name(self)
    }

    fn num_phases(&self) -> usize {
        Package::num_phases(self)
    }

    fn is_long(&self) -> bool {
        Package::is_long(self)
    }

    fn has_baseline(&self) -> bool {
        Package::has_baseline(self)
    }

    fn set_dir(&mut self, dir: &Path) {
        Package::set_dir(self, dir)
    }

    fn check_phase(&self, phase: i64) -> Result<usize> {
        Package::check_phase(self, phase)
    }

    fn describe_case(&self, phase: usize, id: i64) -> Result<String> {
        self.lookup_params(phase, id).map(|params| format!("{:?}", params))
    }

    fn run_case(&mut self, phase: i64, id: i64) -> Result<()> {
        let checked = Package::check_phase(self, phase)?;
        let params = self.lookup_params(checked, id)?;
        // lookup_params only succeeds for ids that fit in usize
        let id = usize::try_from(id).unwrap_or_default();
        self.run(phase, id, &params)
    }

    fn run_phase(&mut self, phase: i64) -> Result<()> {
        Package::run_phase(self, phase)
    }

    fn run_all(&mut self) -> Result<()> {
        for phase in 0..Package::num_phases(self) {
            let vector = self.post_vector(phase)?;
            self.run_vector(&phasekit_core::vector_params(&vector), phase)?;
        }
        Ok(())
    }

    fn update_baseline(&mut self) -> Result<()> {
        Package::update_baseline(self)
    }

    fn run_framework(&mut self, ctx: &mut RunContext<'_>) {
        runner::drive_package(self, ctx)
    }
}

/// A resolved (package, phase, case) coordinate.
pub struct TestRef<'a> {
    package: &'a mut dyn AnyPackage,
    pub phase: usize,
    pub id: usize,
    /// Debug rendering of the case's params
    pub params: String,
}

impl TestRef<'_> {
    pub fn package_name(&self) -> &str {
        self.package.name()
    }

    /// Run this case in isolation.
    pub fn run(self) -> Result<()> {
        self.package.run_case(self.phase as i64, self.id as i64)
    }
}

/// An ordered list of packages.
#[derive(Default)]
pub struct Suite {
    packages: Vec<Box<dyn AnyPackage>>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: TestCase + 'static>(mut self, package: Package<T>) -> Self {
        self.push(package);
        self
    }

    pub fn push<T: TestCase + 'static>(&mut self, package: Package<T>) {
        self.packages.push(Box::new(package));
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Package names in suite order.
    pub fn names(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.name()).collect()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Box<dyn AnyPackage>> {
        self.packages.iter_mut()
    }

    /// Point every package at `dataroot` for baseline storage.
    pub fn set_dataroot(&mut self, dataroot: &Path) {
        for package in &mut self.packages {
            package.set_dir(dataroot);
        }
    }

    pub fn lookup_package(&self, name: &str) -> Result<&dyn AnyPackage> {
        match self.packages.iter().find(|p| p.name() == name) {
            Some(package) => Ok(package.as_ref()),
            None => Err(HarnessError::PackageNotFound { name: name.to_string() }),
        }
    }

    pub fn lookup_package_mut(&mut self, name: &str) -> Result<&mut dyn AnyPackage> {
        match self.packages.iter_mut().find(|p| p.name() == name) {
            Some(package) => Ok(package.as_mut()),
            None => Err(HarnessError::PackageNotFound { name: name.to_string() }),
        }
    }

    /// Resolve `name`, validate `phase`, and fetch case `id` from the phase's post-baseline vector.
    pub fn lookup_test(&mut self, name: &str, phase: i64, id: i64) -> Result<TestRef<'_>> {
        let package = self.lookup_package_mut(name)?;
        let phase = package.check_phase(phase)?;
        let params = package.describe_case(phase, id)?;
        Ok(TestRef {
            package,
            phase,
            // describe_case rejects negative ids
            id: usize::try_from(id).unwrap_or_default(),
            params,
        })
    }

    /// Run one case in isolation, replaying the phases before it.
    pub fn run(&mut self, name: &str, phase: i64, id: i64) -> Result<()> {
        self.lookup_package_mut(name)?.run_case(phase, id)
    }

    /// Run one whole phase of package `name`, replaying the phases before it.
    pub fn run_phase(&mut self, name: &str, phase: i64) -> Result<()> {
        self.lookup_package_mut(name)?.run_phase(phase)
    }

    /// Run every phase of package `name` with its baselines read from `dataroot`.
    pub fn run_all(&mut self, dataroot: &Path, name: &str) -> Result<()> {
        let package = self.lookup_package_mut(name)?;
        package.set_dir(dataroot);
        package.run_all()
    }

    pub fn update_baseline(&mut self, name: &str) -> Result<()> {
        self.lookup_package_mut(name)?.update_baseline()
    }
}
