//! External text process invocation.
//!
//! Both external collaborators (the model and the ranker) are plain
//! programs started with an argument list. [`ProcessRunner`] is the seam
//! between the pipeline and the operating system so that tests can
//! substitute scripted processes.
//!
//! Arguments are handed to the child as argv entries; no shell is involved,
//! so untrusted prompt text cannot be reinterpreted. Both operations wait
//! for the child before returning, which reaps it on every path.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use order_agent_core::escape_argument;
use thiserror::Error;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// When capturing, append the child's stderr to its stdout.
    pub merge_stderr: bool,
}

impl Invocation {
    /// Invocation of `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            merge_stderr: false,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Merge stderr into captured output.
    pub fn merge_stderr(mut self, merge: bool) -> Self {
        self.merge_stderr = merge;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Renders the equivalent shell command line, quoting every argument.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", escape_argument(arg))?;
        }
        Ok(())
    }
}

/// Exit status of a finished child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessStatus {
    /// Status of a child that exited with `code`.
    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Status of a child killed by a signal.
    pub fn signalled() -> Self {
        Self { code: None }
    }

    /// True for exit code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Bytes captured from a finished child, with its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub bytes: Vec<u8>,
    pub status: ProcessStatus,
}

/// Failures starting or reading from a child process.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to capture output of {program}: {source}")]
    Capture {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Runs external programs to completion.
pub trait ProcessRunner {
    /// Run the program with piped output and return what it wrote.
    fn capture(&self, invocation: &Invocation) -> Result<CapturedOutput, ProcessError>;

    /// Run the program with the parent's stdio and return its status.
    fn run_inherited(&self, invocation: &Invocation) -> Result<ProcessStatus, ProcessError>;
}

/// [`ProcessRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn capture(&self, invocation: &Invocation) -> Result<CapturedOutput, ProcessError> {
        let program = invocation.program.display().to_string();
        let mut cmd = invocation.command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(if invocation.merge_stderr {
                Stdio::piped()
            } else {
                Stdio::inherit()
            });

        let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

        // wait_with_output reaps the child even when reading fails.
        let output = child
            .wait_with_output()
            .map_err(|source| ProcessError::Capture { program, source })?;

        let mut bytes = output.stdout;
        if invocation.merge_stderr {
            bytes.extend_from_slice(&output.stderr);
        }

        Ok(CapturedOutput {
            bytes,
            status: output.status.into(),
        })
    }

    fn run_inherited(&self, invocation: &Invocation) -> Result<ProcessStatus, ProcessError> {
        let status = invocation
            .command()
            .stdin(Stdio::inherit())
            .status()
            .map_err(|source| ProcessError::Spawn {
                program: invocation.program.display().to_string(),
                source,
            })?;
        Ok(status.into())
    }
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn capture(&self, invocation: &Invocation) -> Result<CapturedOutput, ProcessError> {
        (**self).capture(invocation)
    }

    fn run_inherited(&self, invocation: &Invocation) -> Result<ProcessStatus, ProcessError> {
        (**self).run_inherited(invocation)
    }
}
