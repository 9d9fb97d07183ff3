//! CLI module for phasekit
//!
//! ## Commands
//!
//! - `list` - Print the suite's packages
//! - `run <package> [--phase N] [--id N]` - Run one case, one phase, or every phase of a package (standalone, fail-fast)
//! - `update-baseline <package>` - Re-validate and refresh a package's baseline files
//! - `test [--short] [-v]` - Run the whole suite with per-case isolation and reproduction commands
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::error::HarnessError;
use crate::suite::Suite;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        // Debug on a miette report renders the diagnostic code and help text
        CliError::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Phase-ordered, table-driven test orchestration
#[derive(Parser, Debug)]
#[command(name = "phasekit")]
#[command(version = VERSION)]
#[command(about = "Run phased test packages and maintain their baselines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Data root holding the `baseline/` directory
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    pub dataroot: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the packages in the suite
    List,

    /// Run a package standalone (stops at the first failure)
    Run {
        /// Package name
        #[arg(value_name = "PACKAGE")]
        package: String,
        /// Phase to run (earlier phases are replayed first)
        #[arg(long, allow_negative_numbers = true)]
        phase: Option<i64>,
        /// Single case within the phase
        #[arg(long, allow_negative_numbers = true)]
        id: Option<i64>,
    },

    /// Re-run a package against its live vectors and refresh its baseline files
    UpdateBaseline {
        /// Package name
        #[arg(value_name = "PACKAGE")]
        package: String,
    },

    /// Run every package with per-case isolation
    Test {
        /// Skip long packages
        #[arg(long)]
        short: bool,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run(suite: Suite) {
    let cli = Cli::parse();
    let mut suite = suite;

    match execute(cli, &mut suite) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command against `suite` and return result.
pub fn execute(cli: Cli, suite: &mut Suite) -> CliResult<ExitCode> {
    suite.set_dataroot(&cli.dataroot);
    match cli.command {
        Command::List => commands::list_packages(suite),
        Command::Run { package, phase, id } => commands::run_package(suite, &cli.dataroot, &package, phase, id),
        Command::UpdateBaseline { package } => commands::update_baseline(suite, &package),
        Command::Test { short, verbose } => {
            let program = env::args().next().unwrap_or_else(|| "phasekit".to_string());
            commands::test_suite(suite, &program, &cli.dataroot, short, verbose)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
