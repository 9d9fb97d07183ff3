//! Run configuration and reproduction-command formatting.

use std::fmt;
use std::path::{Path, PathBuf};

/// Settings for one orchestration run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root directory holding `baseline/`
    pub dataroot: PathBuf,
    /// Skip packages that classify themselves as long
    pub short: bool,
    /// Report every case, not just failures
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataroot: PathBuf::from("."),
            short: false,
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataroot(mut self, dataroot: impl Into<PathBuf>) -> Self {
        self.dataroot = dataroot.into();
        self
    }

    pub fn with_short(mut self, short: bool) -> Self {
        self.short = short;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

type PhaseCommand = Box<dyn Fn(&str, usize) -> String>;
type TestCommand = Box<dyn Fn(&str, usize, usize) -> String>;

/// Formatters producing the command line that reruns one coordinate on its own.
///
/// `phase(name, phase)` covers phase-level failures (setup, baseline load, teardown); `test(name, phase, id)`
/// covers a single case.
pub struct FailCommands {
    phase: PhaseCommand,
    test: TestCommand,
}

impl FailCommands {
    pub fn new(
        phase: impl Fn(&str, usize) -> String + 'static,
        test: impl Fn(&str, usize, usize) -> String + 'static,
    ) -> Self {
        Self {
            phase: Box::new(phase),
            test: Box::new(test),
        }
    }

    /// Commands that invoke the `phasekit` CLI surface of `program`.
    ///
    /// ## Examples
    /// ```rust
    /// use phasekit::FailCommands;
    ///
    /// let cmds = FailCommands::for_program("phasekit", "data");
    /// assert_eq!(cmds.phase("ledger", 1), "phasekit --dataroot data run ledger --phase 1");
    /// assert_eq!(cmds.test("ledger", 1, 4), "phasekit --dataroot data run ledger --phase 1 --id 4");
    /// ```
    pub fn for_program(program: impl Into<String>, dataroot: impl AsRef<Path>) -> Self {
        let prefix = format!(
            "{} --dataroot {}",
            shell_quote(&program.into()),
            shell_quote(&dataroot.as_ref().display().to_string())
        );
        let test_prefix = prefix.clone();
        Self::new(
            move |name, phase| format!("{} run {} --phase {}", prefix, shell_quote(name), phase),
            move |name, phase, id| {
                format!("{} run {} --phase {} --id {}", test_prefix, shell_quote(name), phase, id)
            },
        )
    }

    pub fn phase(&self, name: &str, phase: usize) -> String {
        (self.phase)(name, phase)
    }

    pub fn test(&self, name: &str, phase: usize, id: usize) -> String {
        (self.test)(name, phase, id)
    }
}

impl fmt::Debug for FailCommands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailCommands").finish_non_exhaustive()
    }
}

/// Single-quote `arg` for a POSIX shell when it holds anything beyond a safe set of characters.
fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | ','));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
