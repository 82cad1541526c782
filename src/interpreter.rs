use crate::builtin::BuiltinRegistry;
use crate::command::{ExitCode, STATUS_NOT_EXECUTABLE, STATUS_NOT_FOUND};
use crate::config::ShellConfig;
use crate::env::ShellState;
use crate::error::{ResolveError, ShellError};
use crate::external::PathResolver;
use crate::io_adapters::LineSource;
use crate::lexer::split_into_tokens;
use crate::process::{Launcher, ProcessRunner};
use std::io::Write;

/// Routes one input line at a time to a builtin or an external program.
///
/// Each cycle goes: tokenize, skip if blank, run a builtin if the name matches
/// one, otherwise resolve through `PATH`, spawn and wait. Only a failure to
/// create a process at all comes back as a fatal error; everything else is
/// written to the error stream and becomes the cycle's exit status.
///
/// Example
/// ```no_run
/// use simple_shell::Dispatcher;
/// let mut sh = Dispatcher::default();
/// let code = sh
///     .dispatch("true", &mut std::io::stdout(), &mut std::io::stderr())
///     .unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Dispatcher {
    state: ShellState,
    builtins: BuiltinRegistry,
    resolver: PathResolver,
    launcher: Box<dyn Launcher>,
    max_args: usize,
}

impl Dispatcher {
    /// Create a dispatcher with the default builtins.
    pub fn new(config: &ShellConfig, state: ShellState) -> Self {
        Self::with_builtins(config, state, BuiltinRegistry::default())
    }

    /// Create a dispatcher with a custom set of builtins.
    pub fn with_builtins(config: &ShellConfig, state: ShellState, builtins: BuiltinRegistry) -> Self {
        Self {
            state,
            builtins,
            resolver: PathResolver::new(config.max_path_len),
            launcher: Box::new(ProcessRunner::new()),
            max_args: config.max_args,
        }
    }

    /// Replace how external programs are started.
    pub fn with_launcher(mut self, launcher: impl Launcher + 'static) -> Self {
        self.launcher = Box::new(launcher);
        self
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Run one line of input.
    ///
    /// Returns the command's exit status. A blank line returns 0 and leaves
    /// [`ShellState::last_status`] untouched. `out` receives builtin output and
    /// `err` receives every diagnostic; external programs inherit the real
    /// standard streams.
    pub fn dispatch(
        &mut self,
        line: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<ExitCode, ShellError> {
        let argv = split_into_tokens(line, self.max_args);
        let Some(program) = argv.program() else {
            return Ok(0);
        };

        let status = if self.builtins.is_builtin(program) {
            self.builtins
                .run_builtin(&argv, out, err, &mut self.state)?
                .unwrap_or(0)
        } else {
            match self.resolver.resolve(program, &self.state) {
                Ok(executable) => self
                    .launcher
                    .spawn_and_wait(&executable, &argv, &self.state, err)?
                    .code(),
                Err(e) => {
                    tracing::debug!(command = program, error = %e, "resolution failed");
                    writeln!(err, "{}", e)?;
                    match e {
                        ResolveError::NotFound(_) => STATUS_NOT_FOUND,
                        ResolveError::NotExecutable(_) | ResolveError::PathTooLong { .. } => {
                            STATUS_NOT_EXECUTABLE
                        }
                    }
                }
            }
        };

        tracing::debug!(command = program, status, "dispatched");
        self.state.last_status = status;
        Ok(status)
    }
}

impl Default for Dispatcher {
    /// A dispatcher over the current process environment with default settings.
    fn default() -> Self {
        Self::new(&ShellConfig::default(), ShellState::capture())
    }
}

/// Feed lines from `source` to `dispatcher` until end of input.
///
/// Read failures skip the line. Non-fatal dispatch errors are reported and
/// counted as a failed command. A fatal error ends the loop and is returned.
pub fn repl(
    dispatcher: &mut Dispatcher,
    source: &mut dyn LineSource,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), ShellError> {
    loop {
        let line = match source.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("end of input");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable line");
                // Best effort: losing the diagnostic must not stop the loop.
                let _ = writeln!(err, "simple_shell: {:#}", e);
                continue;
            }
        };

        match dispatcher.dispatch(&line, out, err) {
            Ok(_) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                // Best effort, as above.
                let _ = writeln!(err, "simple_shell: {}", e);
                dispatcher.state.last_status = 1;
            }
        }
    }
}
