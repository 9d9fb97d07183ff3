//! Framework runner: per-case isolation, phase-level failures, short mode, reproduction commands.

mod common;

use std::path::Path;

use common::{Log, RecordingReporter, Scripted};
use phasekit::runner::REPRO_HEADER;
use phasekit::{FailCommands, Package, RunConfig, RunSummary, Suite, run_suite};

fn commands() -> FailCommands {
    FailCommands::new(
        |name, phase| format!("rerun {name} {phase}"),
        |name, phase, id| format!("rerun {name} {phase} {id}"),
    )
}

fn run(suite: &mut Suite, config: &RunConfig) -> (RunSummary, RecordingReporter) {
    let mut reporter = RecordingReporter::default();
    let summary = run_suite(config, &commands(), suite, &mut reporter);
    (summary, reporter)
}

#[test]
fn failing_cases_do_not_stop_siblings() {
    let log = Log::default();
    let mut suite = Suite::new().with(Package::new(
        "p",
        Scripted::new(&log, &[&["a", "fail-b", "panic-c", "stop-d", "e"]]),
    ));

    let (summary, reporter) = run(&mut suite, &RunConfig::new());

    assert_eq!(
        reporter.events,
        vec!["phase p:0", "pass p:0/0", "fail p:0/1", "fail p:0/2", "fail p:0/3", "pass p:0/4", "done"]
    );
    assert_eq!(
        log.entries(),
        vec![
            "setup 0",
            "run a",
            "done a",
            "run fail-b",
            "done fail-b",
            "run panic-c",
            "run stop-d",
            "run e",
            "done e",
            "teardown 0"
        ]
    );
    assert_eq!((summary.passed, summary.failed), (2, 3));
    assert_eq!(summary.phases_completed, 1);
    assert!(!summary.is_success());
}

#[test]
fn case_failures_carry_their_repro_command() {
    let log = Log::default();
    let mut suite = Suite::new().with(Package::new(
        "p",
        Scripted::new(&log, &[&["a", "fail-b", "panic-c", "stop-d"]]),
    ));

    let (summary, reporter) = run(&mut suite, &RunConfig::new());

    let messages: Vec<_> = summary.failures.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            format!("fail-b failed\n{REPRO_HEADER}\nrerun p 0 1\n{REPRO_HEADER}\n\n"),
            format!("panicked: panic-c blew up\n{REPRO_HEADER}\nrerun p 0 2\n{REPRO_HEADER}\n\n"),
            format!("stop-d stopped\n{REPRO_HEADER}\nrerun p 0 3\n{REPRO_HEADER}\n\n"),
        ]
    );
    assert_eq!(summary.failures[0].id, Some(1));
    assert_eq!(reporter.outcomes[1].params, "\"fail-b\"");
    assert!(reporter.outcomes[0].passed());
}

#[test]
fn short_mode_skips_long_packages() {
    let log = Log::default();
    let mut suite = Suite::new()
        .with(Package::new("big", Scripted::new(&log, &[&["a"]]).long()))
        .with(Package::new("small", Scripted::new(&log, &[&["b"]])));

    let (summary, reporter) = run(&mut suite, &RunConfig::new().with_short(true));

    assert_eq!(
        reporter.events,
        vec![
            "skip big: package big: skipping big test in short test run",
            "phase small:0",
            "pass small:0/0",
            "done"
        ]
    );
    assert_eq!(summary.packages_skipped, 1);
    assert_eq!(summary.packages_run, 1);
    assert!(summary.is_success());
}

#[test]
fn long_packages_run_outside_short_mode() {
    let log = Log::default();
    let mut suite = Suite::new().with(Package::new("big", Scripted::new(&log, &[&["a"]]).long()));
    let (summary, _) = run(&mut suite, &RunConfig::new());
    assert_eq!(summary.packages_skipped, 0);
    assert_eq!(summary.passed, 1);
}

#[test]
fn setup_failure_abandons_rest_of_package() {
    let log = Log::default();
    let mut failing = Scripted::new(&log, &[&["a"], &["b"], &["c"]]);
    failing.fail_setup = Some(1);
    let other = Log::default();
    let mut suite = Suite::new()
        .with(Package::new("p", failing).with_phases(3))
        .with(Package::new("q", Scripted::new(&other, &[&["z"]])));

    let (summary, reporter) = run(&mut suite, &RunConfig::new());

    assert_eq!(
        reporter.events,
        vec!["phase p:0", "pass p:0/0", "phase-failed p:1", "phase q:0", "pass q:0/0", "done"]
    );
    assert_eq!(log.entries(), vec!["setup 0", "run a", "done a", "teardown 0", "setup 1"]);
    assert_eq!(summary.phases_completed, 2);

    let failure = &reporter.phase_failures[0];
    assert_eq!(failure.id, None);
    assert!(failure.message.contains("cannot set up phase 1"));
    assert!(failure.message.ends_with(&format!("{REPRO_HEADER}\nrerun p 1\n{REPRO_HEADER}\n\n")));
}

#[test]
fn teardown_failure_is_reported_after_cases() {
    let log = Log::default();
    let mut failing = Scripted::new(&log, &[&["a", "b"], &["c"]]);
    failing.fail_teardown = Some(0);
    let mut suite = Suite::new().with(Package::new("p", failing).with_phases(2));

    let (summary, reporter) = run(&mut suite, &RunConfig::new());

    assert_eq!(
        reporter.events,
        vec!["phase p:0", "pass p:0/0", "pass p:0/1", "phase-failed p:0", "done"]
    );
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.phases_completed, 0);
    assert!(!summary.is_success());
}

#[test]
fn missing_baseline_fails_the_phase() {
    let dir = tempfile::tempdir().unwrap();
    let log = Log::default();
    let mut suite = Suite::new().with(Package::new("p", Scripted::new(&log, &[&["a"]])).with_baseline());

    let (summary, reporter) = run(&mut suite, &RunConfig::new().with_dataroot(dir.path()));

    assert_eq!(reporter.events, vec!["phase-failed p:0", "done"]);
    assert_eq!(log.entries(), vec!["setup 0"]);
    let expected = dir.path().join("baseline").join("p.0.json");
    assert!(summary.failures[0].message.contains(&expected.display().to_string()));
}

#[test]
fn baseline_drives_cases_instead_of_live_vector() {
    let dir = tempfile::tempdir().unwrap();
    let log = Log::default();

    let mut approved = Suite::new().with(Package::new("p", Scripted::new(&log, &[&["a", "b"]])).with_baseline());
    approved.set_dataroot(dir.path());
    approved.update_baseline("p").unwrap();

    // Same package with a live vector that has drifted since approval
    log.clear();
    let mut drifted = Suite::new().with(Package::new("p", Scripted::new(&log, &[&["x"]])).with_baseline());
    let (summary, reporter) = run(&mut drifted, &RunConfig::new().with_dataroot(dir.path()));

    assert_eq!(reporter.events, vec!["phase p:0", "pass p:0/0", "pass p:0/1", "done"]);
    assert_eq!(
        log.entries(),
        vec!["setup 0", "run a", "done a", "run b", "done b", "teardown 0"]
    );
    assert!(summary.is_success());
}

#[test]
fn program_commands_name_the_cli_invocation() {
    let log = Log::default();
    let mut suite = Suite::new().with(Package::new("p", Scripted::new(&log, &[&["a", "fail-b"]])));
    let config = RunConfig::new().with_dataroot("data");
    let commands = FailCommands::for_program("phasekit", Path::new("data"));
    let mut reporter = RecordingReporter::default();

    let summary = run_suite(&config, &commands, &mut suite, &mut reporter);

    assert_eq!(summary.failures.len(), 1);
    assert!(
        summary.failures[0]
            .message
            .contains("\nphasekit --dataroot data run p --phase 0 --id 1\n")
    );
}

#[test]
fn empty_suite_succeeds() {
    let mut suite = Suite::new();
    assert!(suite.is_empty());
    let (summary, reporter) = run(&mut suite, &RunConfig::new());
    assert!(summary.is_success());
    assert_eq!(summary.packages_run, 0);
    assert_eq!(reporter.events, vec!["done"]);
}
