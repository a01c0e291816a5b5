#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runs a student program against fixed, line-oriented input.

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;
use itertools::Itertools;
use which::which;

use crate::{
    config::Settings,
    constants::DEFAULT_INTERPRETER,
    process::{Collected, StdinSource, run_blocking},
};

/// Builds the stdin payload: every input followed by a newline.
pub fn stdin_payload<S: AsRef<str>>(inputs: &[S]) -> String {
    let mut payload = inputs.iter().map(AsRef::<str>::as_ref).join("\n");
    payload.push('\n');
    payload
}

/// Runs programs through an interpreter, converting every outcome to text.
#[derive(Debug, Clone)]
pub struct ProgramRunner {
    /// Interpreter the program path is passed to.
    interpreter: OsString,
    /// Optional upper bound on each run.
    deadline:    Option<Duration>,
}

impl Default for ProgramRunner {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }
}

impl ProgramRunner {
    /// Creates a runner that invokes `interpreter <program>`.
    pub fn new(interpreter: impl AsRef<OsStr>) -> Self {
        Self {
            interpreter: interpreter.as_ref().to_os_string(),
            deadline:    None,
        }
    }

    /// Creates a runner using the interpreter and deadline in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.interpreter()).with_deadline(settings.run_timeout())
    }

    /// Sets an upper bound on each run; `None` waits indefinitely.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns the interpreter, resolved against `PATH` when possible.
    fn interpreter_path(&self) -> OsString {
        which(&self.interpreter)
            .map(PathBuf::into_os_string)
            .unwrap_or_else(|_| self.interpreter.clone())
    }

    /// Spawns the program and waits for it.
    fn spawn<S: AsRef<str>>(&self, inputs: &[S], program: &Path) -> Result<Collected> {
        let stdin = StdinSource::Bytes(stdin_payload(inputs).into_bytes());
        let args = [program.as_os_str().to_os_string()];
        run_blocking(self.interpreter_path(), &args, stdin, &[], self.deadline)
    }

    /// Runs `program` with `inputs` on stdin.
    ///
    /// Returns stdout on success, `Error: {stderr}` on a non-zero exit, and
    /// `Unexpected error: {message}` when the program could not be run at all.
    pub fn run<S: AsRef<str>>(&self, inputs: &[S], program: impl AsRef<Path>) -> String {
        let program = program.as_ref();
        match self.spawn(inputs, program) {
            Ok(collected) if collected.status.success() => collected.stdout_lossy(),
            Ok(collected) => {
                tracing::debug!("{} exited with {}", program.display(), collected.status);
                format!("Error: {}", collected.stderr_lossy())
            }
            Err(e) => format!("Unexpected error: {e:#}"),
        }
    }
}

/// Runs `program` with the default interpreter.
pub fn run_program<S: AsRef<str>>(inputs: &[S], program: impl AsRef<Path>) -> String {
    ProgramRunner::default().run(inputs, program)
}
