use crate::env::ShellState;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Status reported when a command name cannot be resolved.
pub const STATUS_NOT_FOUND: ExitCode = 127;

/// Status reported when a resolved name cannot be executed.
pub const STATUS_NOT_EXECUTABLE: ExitCode = 126;

/// Object-safe trait for a command that runs inside the shell process.
pub trait ExecutableCommand {
    /// Executes the command. `out` receives regular output and `err` receives
    /// diagnostics.
    fn execute(
        self: Box<Self>,
        out: &mut dyn Write,
        err: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<ExitCode>;
}

/// Factory that creates an in-process command from its arguments.
pub trait CommandFactory {
    /// Name the command is invoked by.
    fn name(&self) -> &'static str;

    /// Build a command instance from the operands following the name.
    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand>;
}
