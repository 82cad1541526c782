use crate::command::ExitCode;
use crate::env::ShellState;
use crate::error::ShellError;
use crate::external::ResolvedExecutable;
use crate::lexer::ArgumentVector;
use std::io::{self, Write};
use std::process::{Command, ExitStatus};

/// Status reported when the child could not load the program image.
pub const EXEC_FAILURE_STATUS: ExitCode = 1;

/// How a child process ended, as observed by the waiting shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with the given code.
    Exited(ExitCode),
    /// Killed by a signal.
    Signaled(i32),
    /// The image replacement failed; nothing ran.
    ExecFailed,
}

impl ExitOutcome {
    /// Shell-style status: signals map to `128 + signal`.
    pub fn code(self) -> ExitCode {
        match self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Signaled(signal) => 128 + signal,
            ExitOutcome::ExecFailed => EXEC_FAILURE_STATUS,
        }
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => ExitOutcome::Exited(code),
            None => terminated_by_signal(status),
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> ExitOutcome {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => ExitOutcome::Signaled(signal),
        None => ExitOutcome::Exited(-1),
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> ExitOutcome {
    ExitOutcome::Exited(-1)
}

/// Starts an external program and waits for it to finish.
pub trait Launcher {
    /// Start `executable` with the operands of `argv` and wait for it.
    ///
    /// An `Err` is reserved for failures the shell cannot continue after;
    /// anything else is reported on `err` and folded into the outcome.
    fn spawn_and_wait(
        &self,
        executable: &ResolvedExecutable,
        argv: &ArgumentVector,
        state: &ShellState,
        err: &mut dyn Write,
    ) -> Result<ExitOutcome, ShellError>;
}

/// Runs external programs one at a time.
///
/// The child gets exactly the shell's variables as its environment and the
/// shell's working directory, and inherits stdin, stdout and stderr. The
/// caller is blocked until the child terminates, so at most one child exists.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for ProcessRunner {
    /// When the OS cannot create a process at all the error is
    /// [`ShellError::Spawn`], which the shell treats as fatal. Any other
    /// launch failure (permissions, a file that changed since it was
    /// resolved, a bad working directory) is written to `err` and reported as
    /// [`ExitOutcome::ExecFailed`].
    fn spawn_and_wait(
        &self,
        executable: &ResolvedExecutable,
        argv: &ArgumentVector,
        state: &ShellState,
        err: &mut dyn Write,
    ) -> Result<ExitOutcome, ShellError> {
        let mut cmd = Command::new(executable.path());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(executable.name());
        }
        cmd.args(argv.operands())
            .env_clear()
            .envs(&state.vars)
            .current_dir(&state.current_dir);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if is_resource_exhaustion(&e) => {
                tracing::error!(program = executable.name(), error = %e, "cannot create process");
                return Err(ShellError::Spawn {
                    program: executable.name().to_string(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!(path = %executable.path().display(), error = %e, "exec failed");
                writeln!(err, "{}: {}", executable.path().display(), os_message(&e))?;
                return Ok(ExitOutcome::ExecFailed);
            }
        };

        tracing::debug!(pid = child.id(), program = executable.name(), "spawned");
        let outcome = ExitOutcome::from(child.wait()?);
        tracing::debug!(?outcome, "child finished");
        Ok(outcome)
    }
}

/// The error text without the trailing ` (os error N)` that `io::Error` adds.
fn os_message(e: &io::Error) -> String {
    let text = e.to_string();
    match text.rfind(" (os error ") {
        Some(end) => text[..end].to_string(),
        None => text,
    }
}

/// Process creation failed for lack of resources rather than because of the
/// program itself.
#[cfg(unix)]
fn is_resource_exhaustion(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::EAGAIN) | Some(libc::ENOMEM))
}

#[cfg(not(unix))]
fn is_resource_exhaustion(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::OutOfMemory
}
