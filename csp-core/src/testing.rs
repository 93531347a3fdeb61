// csp-core/src/testing.rs
// Scriptable ProcessRunner used by unit tests.

use std::cell::RefCell;

use csp_aio::{CommandOutput, CommandSpec, ProcessRunner};
use csp_common::error::{CspError, Result};

#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: RefCell<Vec<CommandSpec>>,
    /// (substring of the rendered command line, canned result)
    responses: Vec<(String, Result<CommandOutput>)>,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, needle: &str, code: i32, stdout: &str) -> Self {
        self.responses.push((
            needle.to_string(),
            Ok(CommandOutput {
                status_code: Some(code),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        ));
        self
    }

    pub(crate) fn fail_to_spawn(mut self, needle: &str) -> Self {
        self.responses.push((
            needle.to_string(),
            Err(CspError::CommandExecError(format!("{needle}: not found"))),
        ));
        self
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());
        let line = spec.to_string();
        self.responses
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| {
                Ok(CommandOutput {
                    status_code: Some(0),
                    ..CommandOutput::default()
                })
            })
    }
}
