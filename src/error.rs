//! Errors returned by package, suite, and baseline operations.
//!
//! Assertion failures raised inside a case go to a [`FailureSink`](phasekit_core::FailureSink). They only become a
//! [`HarnessError::CaseFailed`] on the standalone path, where a failed case aborts the rest of its vector.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use phasekit_core::CaseError;
use thiserror::Error;

/// Result alias for orchestration operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Coarse classification of a [`HarnessError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    OutOfRange,
    NotFound,
    SetupFailure,
    TeardownFailure,
    AssertionFailure,
    BaselineIoFailure,
    BaselineDecodeFailure,
    NoBaseline,
}

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("package \"{package}\": phase {phase} not allowed{}", phase_limit(.phase, .phases))]
    #[diagnostic(code(phasekit::phase_out_of_range))]
    PhaseOutOfRange { package: String, phase: i64, phases: usize },

    #[error("test package not found: {name}")]
    #[diagnostic(code(phasekit::package_not_found), help("`phasekit list` prints the registered packages"))]
    PackageNotFound { name: String },

    #[error("test {id} in package {package} not found")]
    #[diagnostic(code(phasekit::case_not_found))]
    CaseNotFound { package: String, id: i64 },

    #[error("package \"{package}\": setup phase {phase} failed: {source}")]
    #[diagnostic(code(phasekit::setup))]
    Setup {
        package: String,
        phase: usize,
        #[source]
        source: CaseError,
    },

    #[error("package \"{package}\": teardown phase {phase} failed: {source}")]
    #[diagnostic(code(phasekit::teardown))]
    Teardown {
        package: String,
        phase: usize,
        #[source]
        source: CaseError,
    },

    #[error("package \"{package}\": phase {phase} test {id} failed: {message}")]
    #[diagnostic(code(phasekit::case_failed))]
    CaseFailed {
        package: String,
        phase: usize,
        id: usize,
        message: String,
    },

    #[error("package \"{package}\" does not use a baseline")]
    #[diagnostic(code(phasekit::no_baseline))]
    NoBaseline { package: String },

    #[error("{}: {source}", .path.display())]
    #[diagnostic(
        code(phasekit::baseline::io),
        help("`phasekit update-baseline <PACKAGE>` creates missing baseline files")
    )]
    BaselineIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: unmarshaling error: {source}", .path.display())]
    #[diagnostic(code(phasekit::baseline::decode))]
    BaselineDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: marshaling error: {source}", .path.display())]
    #[diagnostic(code(phasekit::baseline::encode))]
    BaselineEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl HarnessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HarnessError::PhaseOutOfRange { .. } => ErrorKind::OutOfRange,
            HarnessError::PackageNotFound { .. } | HarnessError::CaseNotFound { .. } => ErrorKind::NotFound,
            HarnessError::Setup { .. } => ErrorKind::SetupFailure,
            HarnessError::Teardown { .. } => ErrorKind::TeardownFailure,
            HarnessError::CaseFailed { .. } => ErrorKind::AssertionFailure,
            HarnessError::NoBaseline { .. } => ErrorKind::NoBaseline,
            HarnessError::BaselineIo { .. } | HarnessError::BaselineEncode { .. } => ErrorKind::BaselineIoFailure,
            HarnessError::BaselineDecode { .. } => ErrorKind::BaselineDecodeFailure,
        }
    }
}

/// Negative phases get no suffix; too-large phases name the phase count.
fn phase_limit(phase: &i64, phases: &usize) -> String {
    if *phase < 0 {
        return String::new();
    }
    let s = if *phases == 1 { "" } else { "s" };
    format!(" as package has only {} phase{}", phases, s)
}
