//! Framework runner: drives a whole suite with per-case isolation and reproduction commands.
//!
//! ## Execution model
//!
//! For every package (in suite order), every phase: setup, load the post-baseline vector, run each case as an
//! independent sub-test, teardown. A failing or panicking case does not stop its siblings. A failing setup,
//! vector load, or teardown is fatal for the phase, and the package's later phases are abandoned because they
//! build on this one.
//!
//! ## Reproduction commands
//!
//! Every failure message carries the command that reruns the failing coordinate on its own, wrapped in
//! [`REPRO_HEADER`] lines.
//!
//! ## Short mode
//!
//! With [`RunConfig::short`], packages whose test reports `is_long()` are skipped whole, with a notice.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use phasekit_core::{FailureSink, TestCase, Vector};
use tracing::{info, warn};

use crate::config::{FailCommands, RunConfig};
use crate::error::HarnessError;
use crate::package::Package;
use crate::suite::Suite;

/// Frames the reproduction command in failure messages.
pub const REPRO_HEADER: &str = "=== RUN THIS TO REPRODUCE FAILED TEST ===";

/// Append the reproduction block for `command` to `message`.
pub fn with_repro(message: &str, command: &str) -> String {
    format!("{}\n{}\n{}\n{}\n\n", message, REPRO_HEADER, command, REPRO_HEADER)
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of one case.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub package: String,
    pub phase: usize,
    pub id: usize,
    /// Debug rendering of the case's params
    pub params: String,
    /// Failure messages, each with its reproduction block; empty when the case passed
    pub failures: Vec<String>,
    pub duration: Duration,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A failure recorded by the runner: one case, or a whole phase when `id` is `None`.
#[derive(Debug, Clone)]
pub struct Failure {
    pub package: String,
    pub phase: usize,
    pub id: Option<usize>,
    pub message: String,
}

/// Totals for a run.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub packages_run: usize,
    pub packages_skipped: usize,
    pub phases_completed: usize,
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<Failure>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// Reporter Trait
// ============================================================================

/// Receives run events. Implement this to customize output.
pub trait Reporter {
    /// Called when a long package is skipped in a short run
    fn on_package_skipped(&mut self, package: &str, reason: &str);

    /// Called after a phase's setup succeeded and before its first case
    fn on_phase_start(&mut self, _package: &str, _phase: usize) {}

    /// Called when a case completes
    fn on_case_complete(&mut self, outcome: &CaseOutcome);

    /// Called when setup, vector load, or teardown of a phase fails
    fn on_phase_failed(&mut self, failure: &Failure);

    /// Called when all packages have been processed
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Default console reporter
#[derive(Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn on_package_skipped(&mut self, package: &str, reason: &str) {
        eprintln!("{} \x1b[33mSKIPPED\x1b[0m ({})", package, reason);
    }

    fn on_phase_start(&mut self, package: &str, phase: usize) {
        if self.verbose {
            eprintln!("\x1b[1m{}:{}\x1b[0m", package, phase);
        }
    }

    fn on_case_complete(&mut self, outcome: &CaseOutcome) {
        let passed = outcome.passed();
        if self.verbose {
            let status = if passed {
                format!("\x1b[32mPASSED\x1b[0m ({:.0}ms)", outcome.duration.as_millis())
            } else {
                format!("\x1b[31mFAILED\x1b[0m ({:.0}ms)", outcome.duration.as_millis())
            };
            eprintln!("  {}:{}/{} {}", outcome.package, outcome.phase, outcome.id, status);
        } else if passed {
            eprint!("\x1b[32m.\x1b[0m");
        } else {
            eprint!("\x1b[31mF\x1b[0m");
        }

        for message in &outcome.failures {
            eprintln!("\n\x1b[31m{}:{}/{}\x1b[0m {}", outcome.package, outcome.phase, outcome.id, outcome.params);
            eprint!("{}", message);
        }
    }

    fn on_phase_failed(&mut self, failure: &Failure) {
        eprintln!("\n\x1b[1;31m{}:{} phase failed\x1b[0m", failure.package, failure.phase);
        eprint!("{}", failure.message);
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        if !self.verbose {
            eprintln!();
        }
        eprintln!();

        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("\x1b[32m{} passed\x1b[0m", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("\x1b[31m{} failed\x1b[0m", summary.failed));
        }
        let phase_failures = summary.failures.iter().filter(|f| f.id.is_none()).count();
        if phase_failures > 0 {
            parts.push(format!("\x1b[31m{} phase errors\x1b[0m", phase_failures));
        }
        if summary.packages_skipped > 0 {
            parts.push(format!("\x1b[33m{} packages skipped\x1b[0m", summary.packages_skipped));
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }

        eprintln!(
            "====== {} in {:.2}s ======",
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
    }
}

// ============================================================================
// Framework sink
// ============================================================================

/// Unwind payload used by [`ReproSink::fail_now`].
struct FailNow;

/// Failure sink for one framework case. Messages get the case's reproduction block appended.
pub struct ReproSink {
    command: String,
    messages: Vec<String>,
}

impl ReproSink {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl FailureSink for ReproSink {
    fn report(&mut self, message: String) {
        self.messages.push(with_repro(&message, &self.command));
    }

    fn fail_now(&mut self) -> ! {
        // Unwinds to the case boundary in `run_isolated`; no panic hook output.
        panic::resume_unwind(Box::new(FailNow))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run one case, turning `fail_now` and panics into failures of this case only.
fn run_isolated<T: TestCase>(test: &mut T, params: &T::Params, command: String) -> Vec<String> {
    let mut sink = ReproSink::new(command);
    let result = panic::catch_unwind(AssertUnwindSafe(|| test.run(&mut sink, params)));
    if let Err(payload) = result {
        if payload.downcast_ref::<FailNow>().is_none() {
            sink.report(format!("panicked: {}", panic_message(payload.as_ref())));
        }
    }
    sink.into_messages()
}

// ============================================================================
// Driving
// ============================================================================

/// Shared state while a run is in progress.
pub struct RunContext<'a> {
    commands: &'a FailCommands,
    reporter: &'a mut dyn Reporter,
    summary: RunSummary,
}

impl<'a> RunContext<'a> {
    fn new(commands: &'a FailCommands, reporter: &'a mut dyn Reporter) -> Self {
        Self {
            commands,
            reporter,
            summary: RunSummary::default(),
        }
    }

    fn phase_failed(&mut self, package: &str, phase: usize, error: &HarnessError) {
        warn!(package, phase, error = %error, "phase failed");
        let failure = Failure {
            package: package.to_string(),
            phase,
            id: None,
            message: with_repro(&error.to_string(), &self.commands.phase(package, phase)),
        };
        self.reporter.on_phase_failed(&failure);
        self.summary.failures.push(failure);
    }

    fn case_complete(&mut self, outcome: CaseOutcome) {
        self.reporter.on_case_complete(&outcome);
        if outcome.passed() {
            self.summary.passed += 1;
            return;
        }
        self.summary.failed += 1;
        for message in &outcome.failures {
            self.summary.failures.push(Failure {
                package: outcome.package.clone(),
                phase: outcome.phase,
                id: Some(outcome.id),
                message: message.clone(),
            });
        }
    }
}

/// Drive every phase of one package. Called through [`AnyPackage::run_framework`](crate::suite::AnyPackage).
pub(crate) fn drive_package<T: TestCase>(package: &mut Package<T>, ctx: &mut RunContext<'_>) {
    let name = package.name().to_string();
    for phase in 0..package.num_phases() {
        if let Err(e) = package.setup(phase) {
            ctx.phase_failed(&name, phase, &e);
            return;
        }
        let vector = match package.post_vector(phase) {
            Ok(vector) => vector,
            Err(e) => {
                ctx.phase_failed(&name, phase, &e);
                return;
            }
        };
        ctx.reporter.on_phase_start(&name, phase);

        let mut id = 0;
        while let Some(params) = vector.params(id) {
            let start = Instant::now();
            let command = ctx.commands.test(&name, phase, id);
            let failures = run_isolated(package.test_mut(), &params, command);
            ctx.case_complete(CaseOutcome {
                package: name.clone(),
                phase,
                id,
                params: format!("{:?}", params),
                failures,
                duration: start.elapsed(),
            });
            id += 1;
        }

        if let Err(e) = package.teardown(phase) {
            ctx.phase_failed(&name, phase, &e);
            return;
        }
        ctx.summary.phases_completed += 1;
    }
}

/// Run every package of `suite` against `config.dataroot`, reporting to `reporter`.
pub fn run_suite(
    config: &RunConfig,
    commands: &FailCommands,
    suite: &mut Suite,
    reporter: &mut dyn Reporter,
) -> RunSummary {
    let start = Instant::now();
    suite.set_dataroot(&config.dataroot);

    let mut ctx = RunContext::new(commands, reporter);
    for package in suite.iter_mut() {
        if config.short && package.is_long() {
            let reason = format!("package {}: skipping big test in short test run", package.name());
            info!(package = package.name(), "skipping long package");
            ctx.reporter.on_package_skipped(package.name(), &reason);
            ctx.summary.packages_skipped += 1;
            continue;
        }
        ctx.summary.packages_run += 1;
        package.run_framework(&mut ctx);
    }

    let mut summary = ctx.summary;
    summary.duration = start.elapsed();
    ctx.reporter.on_run_complete(&summary);
    summary
}
