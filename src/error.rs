//! Error types for the cross-prepare task.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Coarse classification of a [`TaskError`], used for exit codes and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingFile,
    RootAlreadyExists,
    UnsupportedEnvironment,
    InvalidArguments,
    CommandFailed,
    Io,
}

/// Every way a cross-prepare invocation can fail. None of these are retried.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{reason}: {}", .path.display())]
    MissingFile { path: PathBuf, reason: String },

    #[error("Root directory {} already exists (use --allow-existing-root to reuse it)", .0.display())]
    RootAlreadyExists(PathBuf),

    #[error("Unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{message} (exit code {code})")]
    CommandFailed { message: String, code: i32 },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl TaskError {
    pub fn missing_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MissingFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFile { .. } => ErrorKind::MissingFile,
            Self::RootAlreadyExists(_) => ErrorKind::RootAlreadyExists,
            Self::UnsupportedEnvironment(_) => ErrorKind::UnsupportedEnvironment,
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::CommandFailed { .. } => ErrorKind::CommandFailed,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Process exit code the CLI reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidArguments => 2,
            ErrorKind::MissingFile => 3,
            ErrorKind::RootAlreadyExists => 4,
            ErrorKind::UnsupportedEnvironment => 5,
            ErrorKind::CommandFailed => 6,
            ErrorKind::Io => 1,
        }
    }
}

/// Attach a message to an `io::Result`, in the spirit of `anyhow::Context`.
pub trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| TaskError::io(f(), e))
    }
}
