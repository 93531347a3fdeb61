// csp-aio/src/process.rs
use std::fmt;
use std::process::{Command, Stdio};

use csp_common::error::{CspError, Result};
use tracing::{debug, error};

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Wraps the command in `sudo`.
    pub fn sudo(self) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: "sudo".to_string(),
            args,
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// Runs a command to completion and captures its output.
///
/// A nonzero exit is reported through [`CommandOutput`], not as an error;
/// only failing to start the process is an `Err`. Calls block with no
/// timeout.
pub trait ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        (**self).run(spec)
    }
}

/// [`ProcessRunner`] backed by `std::process::Command`.
///
/// Blocks the calling thread until the child exits. The `csp` binary runs
/// on a current-thread runtime with no other tasks in flight, so nothing
/// is starved while an installer runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!("Running command: {}", spec);
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(Stdio::null()); // Prevent hanging on stdin

        match cmd.output() {
            Ok(output) => {
                let result = CommandOutput {
                    status_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                };
                if !output.status.success() {
                    debug!("Command failed with status: {}", output.status);
                    if !result.stdout.trim().is_empty() {
                        debug!("Stdout:\n{}", result.stdout.trim());
                    }
                    if !result.stderr.trim().is_empty() {
                        debug!("Stderr:\n{}", result.stderr.trim());
                    }
                } else {
                    debug!("Command finished successfully.");
                }
                Ok(result)
            }
            Err(e) => {
                error!("Failed to execute {}: {}", spec.program, e);
                Err(CspError::CommandExecError(format!("{spec}: {e}")))
            }
        }
    }
}
