use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a command name could not be turned into something runnable.
///
/// All of them are reported to the user and the shell keeps reading input.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{0}: command not found")]
    NotFound(String),

    #[error("{}: Permission denied", .0.display())]
    NotExecutable(PathBuf),

    #[error("{}: path longer than {max} bytes", .path.display())]
    PathTooLong { path: PathBuf, max: usize },
}

/// Failures that escape a dispatch cycle.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The OS refused to create a child process at all. Fatal.
    #[error("{program}: cannot create process: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Builtin(#[from] anyhow::Error),
}

impl ShellError {
    /// Whether the interactive loop has to stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Spawn { .. })
    }
}
