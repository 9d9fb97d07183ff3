//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::Path;

use crate::config::{FailCommands, RunConfig};
use crate::runner::{self, ConsoleReporter};
use crate::suite::Suite;

use super::{CliError, CliResult, ExitCode};

/// Print one line per package: name, phase count, classification, baseline use.
pub fn list_packages(suite: &Suite) -> CliResult<ExitCode> {
    if suite.is_empty() {
        println!("no packages registered");
        return Ok(ExitCode::SUCCESS);
    }
    for name in suite.names() {
        let package = suite.lookup_package(name)?;
        let kind = if package.is_long() { "long" } else { "short" };
        let baseline = if package.has_baseline() { ", baseline" } else { "" };
        let s = if package.num_phases() == 1 { "" } else { "s" };
        println!("{}  ({} phase{}, {}{})", name, package.num_phases(), s, kind, baseline);
    }
    Ok(ExitCode::SUCCESS)
}

/// Standalone run of one case (`--id`), one phase (`--phase`), or every phase.
pub fn run_package(
    suite: &mut Suite,
    dataroot: &Path,
    package: &str,
    phase: Option<i64>,
    id: Option<i64>,
) -> CliResult<ExitCode> {
    match (phase, id) {
        (phase, Some(id)) => {
            let test = suite.lookup_test(package, phase.unwrap_or(0), id)?;
            println!("{}: phase {} test {}: {}", test.package_name(), test.phase, test.id, test.params);
            test.run()?;
        }
        (Some(phase), None) => suite.run_phase(package, phase)?,
        (None, None) => suite.run_all(dataroot, package)?,
    }
    println!("{}: ok", package);
    Ok(ExitCode::SUCCESS)
}

pub fn update_baseline(suite: &mut Suite, package: &str) -> CliResult<ExitCode> {
    suite.update_baseline(package)?;
    println!("{}: baseline up to date", package);
    Ok(ExitCode::SUCCESS)
}

/// Framework run over the whole suite; failures print the command reproducing them through `program`.
pub fn test_suite(
    suite: &mut Suite,
    program: &str,
    dataroot: &Path,
    short: bool,
    verbose: bool,
) -> CliResult<ExitCode> {
    let config = RunConfig::new()
        .with_dataroot(dataroot)
        .with_short(short)
        .with_verbose(verbose);
    let commands = FailCommands::for_program(program, &config.dataroot);
    let mut reporter = ConsoleReporter::new(config.verbose);

    let summary = runner::run_suite(&config, &commands, suite, &mut reporter);
    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Summary already printed by the reporter
        Err(CliError::new("", ExitCode::FAILURE))
    }
}
