//! Shared fixtures for integration tests: a scripted test case that logs every lifecycle call.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use phasekit::{Array, CaseError, FailureSink, TestCase};
use phasekit::runner::{CaseOutcome, Failure, Reporter, RunSummary};

/// Lifecycle log shared between a test and the package that owns the test case.
#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Cases are strings. `fail*` reports a failure, `panic*` panics, `stop*` reports and calls `fail_now`.
#[derive(Default)]
pub struct Scripted {
    pub log: Log,
    /// Live vector per phase
    pub cases: Vec<Vec<String>>,
    pub long: bool,
    pub fail_setup: Option<usize>,
    pub fail_teardown: Option<usize>,
    next: usize,
}

impl Scripted {
    pub fn new(log: &Log, cases: &[&[&str]]) -> Self {
        Self {
            log: log.clone(),
            cases: cases
                .iter()
                .map(|phase| phase.iter().map(|c| c.to_string()).collect())
                .collect(),
            ..Self::default()
        }
    }

    pub fn long(mut self) -> Self {
        self.long = true;
        self
    }
}

impl TestCase for Scripted {
    type Params = String;
    type Vector = Array<String>;

    fn setup(&mut self, phase: usize) -> Result<(), CaseError> {
        self.log.push(format!("setup {phase}"));
        self.next = phase;
        if self.fail_setup == Some(phase) {
            return Err(format!("cannot set up phase {phase}").into());
        }
        Ok(())
    }

    fn vector(&self) -> Array<String> {
        self.cases.get(self.next).cloned().unwrap_or_default().into()
    }

    fn run(&mut self, sink: &mut dyn FailureSink, params: &String) {
        self.log.push(format!("run {params}"));
        if params.starts_with("fail") {
            sink.report(format!("{params} failed"));
        } else if params.starts_with("panic") {
            panic!("{params} blew up");
        } else if params.starts_with("stop") {
            sink.report(format!("{params} stopped"));
            sink.fail_now();
        }
        self.log.push(format!("done {params}"));
    }

    fn teardown(&mut self, phase: usize) -> Result<(), CaseError> {
        self.log.push(format!("teardown {phase}"));
        self.next = phase + 1;
        if self.fail_teardown == Some(phase) {
            return Err(format!("cannot tear down phase {phase}").into());
        }
        Ok(())
    }

    fn is_long(&self) -> bool {
        self.long
    }
}

/// Reporter that keeps one line per event.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Vec<String>,
    pub outcomes: Vec<CaseOutcome>,
    pub phase_failures: Vec<Failure>,
}

impl Reporter for RecordingReporter {
    fn on_package_skipped(&mut self, package: &str, reason: &str) {
        self.events.push(format!("skip {package}: {reason}"));
    }

    fn on_phase_start(&mut self, package: &str, phase: usize) {
        self.events.push(format!("phase {package}:{phase}"));
    }

    fn on_case_complete(&mut self, outcome: &CaseOutcome) {
        let status = if outcome.passed() { "pass" } else { "fail" };
        self.events
            .push(format!("{status} {}:{}/{}", outcome.package, outcome.phase, outcome.id));
        self.outcomes.push(outcome.clone());
    }

    fn on_phase_failed(&mut self, failure: &Failure) {
        self.events.push(format!("phase-failed {}:{}", failure.package, failure.phase));
        self.phase_failures.push(failure.clone());
    }

    fn on_run_complete(&mut self, _summary: &RunSummary) {
        self.events.push("done".to_string());
    }
}
