//! Failure sinks: where a running case sends its assertion failures.
//!
//! Two behaviors exist and the caller picks one by choosing the sink:
//! - the framework runner's sink reports and keeps going, and `fail_now` abandons only the current case;
//! - [`Recorder`], used for ad-hoc standalone runs, keeps the last message and `fail_now` terminates the process.

use std::fmt;
use std::process;

/// Consumer of formatted failure messages.
pub trait FailureSink {
    /// Record a failure and continue.
    fn report(&mut self, message: String);

    /// Stop the current case after the failures reported so far.
    fn fail_now(&mut self) -> !;
}

/// Standalone sink for running cases outside the framework runner.
#[derive(Debug, Default)]
pub struct Recorder {
    last: Option<String>,
    failures: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed(&self) -> bool {
        self.failures > 0
    }

    /// Number of failures reported.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// The most recently reported message.
    pub fn last_message(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// `Err` with the last message if anything was reported.
    pub fn into_result(self) -> Result<(), String> {
        match self.last {
            Some(message) => Err(message),
            None => Ok(()),
        }
    }
}

impl FailureSink for Recorder {
    fn report(&mut self, message: String) {
        self.failures += 1;
        self.last = Some(message);
    }

    fn fail_now(&mut self) -> ! {
        eprintln!("failed test... exiting");
        if let Some(message) = &self.last {
            eprintln!("{}", message);
        }
        process::exit(-1)
    }
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Report `message` unless `ok`. Returns `ok`.
pub fn check(sink: &mut dyn FailureSink, ok: bool, message: impl fmt::Display) -> bool {
    if !ok {
        sink.report(message.to_string());
    }
    ok
}

/// Report a mismatch between `expected` and `actual`. Returns whether they matched.
pub fn check_eq<T: PartialEq + fmt::Debug + ?Sized>(
    sink: &mut dyn FailureSink,
    expected: &T,
    actual: &T,
    context: &str,
) -> bool {
    check(
        sink,
        expected == actual,
        format_args!("{}: expected {:?}, got {:?}", context, expected, actual),
    )
}

/// Like [`check`], but stops the case on failure.
pub fn require(sink: &mut dyn FailureSink, ok: bool, message: impl fmt::Display) {
    if !check(sink, ok, message) {
        sink.fail_now();
    }
}

/// Like [`check_eq`], but stops the case on failure.
pub fn require_eq<T: PartialEq + fmt::Debug + ?Sized>(
    sink: &mut dyn FailureSink,
    expected: &T,
    actual: &T,
    context: &str,
) {
    if !check_eq(sink, expected, actual, context) {
        sink.fail_now();
    }
}

/// Unwrap `result`, or report the error and stop the case.
pub fn require_ok<T, E: fmt::Display>(sink: &mut dyn FailureSink, result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            sink.report(format!("{}: unexpected error: {}", context, e));
            sink.fail_now()
        }
    }
}
