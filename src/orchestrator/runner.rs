/// Process runner
///
/// Spawns the seed and server programs with inherited stdio and waits for them.
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use super::Step;
use crate::cli_utils::command_line;

/// One program to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub step: Step,
    pub program: String,
    pub args: Vec<String>,
    /// Applied on top of the inherited environment
    pub env: BTreeMap<String, String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        command_line(&self.program, &self.args)
    }
}

/// How a spawned program ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub exit_code: i32,
    pub duration: Duration,
}

impl StepOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Spawns programs on behalf of the orchestrator
pub trait ProcessRunner {
    /// Run `invocation` to completion. `Err` means the program never started.
    fn run(&mut self, invocation: &Invocation) -> std::io::Result<StepOutcome>;
}

/// Runs programs as real child processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> std::io::Result<StepOutcome> {
        let start = Instant::now();

        let program = resolve_program(invocation);
        tracing::debug!(
            step = %invocation.step,
            program = %program.display(),
            cwd = %invocation.cwd.display(),
            "spawning"
        );

        let status = Command::new(&program)
            .args(&invocation.args)
            .envs(&invocation.env)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        let outcome = StepOutcome {
            exit_code: exit_code(status),
            duration: start.elapsed(),
        };

        tracing::debug!(
            step = %invocation.step,
            exit_code = outcome.exit_code,
            duration_ms = outcome.duration.as_millis() as u64,
            "exited"
        );

        Ok(outcome)
    }
}

/// Resolve the program on PATH, relative names against the invocation cwd
fn resolve_program(invocation: &Invocation) -> PathBuf {
    which::which_in(
        &invocation.program,
        std::env::var_os("PATH"),
        &invocation.cwd,
    )
    .unwrap_or_else(|e| {
        tracing::debug!(
            program = %invocation.program,
            "not found on PATH ({}), trying as-is",
            e
        );
        PathBuf::from(&invocation.program)
    })
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
