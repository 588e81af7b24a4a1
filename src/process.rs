//! Centralized command execution with consistent error handling.
//!
//! Every external program the task launches goes through [`Cmd`], so launch
//! failures and non-zero exits surface as the same typed errors.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{IoContext, Result, TaskError};

/// Result of a captured command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Get the exit code, or -1 if terminated by signal.
    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }

    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Builder for configuring command execution.
pub struct Cmd {
    program: PathBuf,
    args: Vec<String>,
    /// If true, don't fail on non-zero exit.
    allow_fail: bool,
    /// Replaces the default "'program' failed" message.
    error_prefix: Option<String>,
}

impl Cmd {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            allow_fail: false,
            error_prefix: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Allow non-zero exit codes without failing.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Set a custom error message prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    fn check(self, status: ExitStatus) -> Result<()> {
        if self.allow_fail || status.success() {
            return Ok(());
        }
        let message = self
            .error_prefix
            .unwrap_or_else(|| format!("'{}' failed", self.program.display()));
        Err(TaskError::CommandFailed {
            message,
            code: status.code().unwrap_or(-1),
        })
    }

    /// Run the command and capture output.
    pub fn run(self) -> Result<CommandResult> {
        let output = self
            .command()
            .output()
            .io_context(|| format!("Failed to execute '{}'", self.program.display()))?;
        self.check(output.status)?;

        Ok(CommandResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run the command with inherited stdio. Blocks until it exits.
    pub fn run_interactive(self) -> Result<ExitStatus> {
        let status = self
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .io_context(|| format!("Failed to execute '{}'", self.program.display()))?;
        self.check(status)?;
        Ok(status)
    }
}

/// Runs the staged init binary.
pub trait InitRunner {
    /// Run `program` with no arguments and wait for it. Non-zero exit is an error.
    fn run_init(&self, program: &Path) -> Result<()>;
}

/// Runs the init binary as a real child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl InitRunner for ProcessRunner {
    fn run_init(&self, program: &Path) -> Result<()> {
        Cmd::new(program)
            .error_msg(format!("Init binary {} failed", program.display()))
            .run_interactive()
            .map(|_| ())
    }
}
