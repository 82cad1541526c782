use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::ShellState;
use crate::lexer::ArgumentVector;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Executes the command against the shell state.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, out: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        out: &mut dyn Write,
        err: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, out, state) {
            Ok(x) => Ok(x),
            Err(e) => {
                tracing::debug!(builtin = T::name(), error = %e, "builtin failed");
                writeln!(err, "{:#}", e)?;
                Ok(1)
            }
        }
    }
}

/// Outcome of argument parsing that stopped early: `--help` or a usage error.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        out: &mut dyn Write,
        err: &mut dyn Write,
        _state: &mut ShellState,
    ) -> Result<ExitCode> {
        if self.is_error {
            writeln!(err, "{}", self.output.trim_end())?;
            Ok(1)
        } else {
            writeln!(out, "{}", self.output.trim_end())?;
            Ok(0)
        }
    }
}

/// Creates instances of one builtin type.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand> {
        match T::from_args(&[T::name()], args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        }
    }
}

/// The set of commands handled inside the shell process.
///
/// Builtins never fork. Their failures are written to the error stream and
/// turned into a non-zero status; they never stop the shell.
pub struct BuiltinRegistry {
    commands: Vec<Box<dyn CommandFactory>>,
}

impl BuiltinRegistry {
    /// Create a registry with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { commands }
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Run the builtin named by the first token with the remaining tokens.
    ///
    /// Returns `Ok(None)` when no builtin has that name. An `Err` only means
    /// `out` or `err` could not be written to.
    pub fn run_builtin(
        &self,
        argv: &ArgumentVector,
        out: &mut dyn Write,
        err: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<Option<ExitCode>> {
        let Some(factory) = argv.program().and_then(|name| self.lookup(name)) else {
            return Ok(None);
        };
        tracing::debug!(builtin = factory.name(), "running builtin");
        factory
            .create(&argv.operand_strs())
            .execute(out, err, state)
            .map(Some)
    }

    fn lookup(&self, name: &str) -> Option<&dyn CommandFactory> {
        self.commands
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }
}

impl Default for BuiltinRegistry {
    /// The builtins shipped with the shell: `cd`.
    fn default() -> Self {
        Self::new(vec![Box::new(Factory::<Cd>::default())])
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _out: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        let target = match self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => return Err(anyhow!("cd: missing operand")),
        };

        let new_dir = state.absolutize(&target);

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", target.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: {}", target.display()))?;
        state.current_dir = canonical;
        Ok(0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::lexer::split_into_tokens;
    use std::collections::HashMap;
    use std::env as stdenv;
    use std::io;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Serializes tests that change the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn make_unique_temp_dir(tag: &str) -> io::Result<PathBuf> {
        let mut p = stdenv::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("shell_test_{}_{}_{}", tag, std::process::id(), nanos));
        fs::create_dir_all(&p)?;
        fs::canonicalize(p)
    }

    fn state_in(dir: PathBuf) -> ShellState {
        ShellState::with_vars(HashMap::<String, String>::new(), dir)
    }

    fn run(registry: &BuiltinRegistry, line: &str, state: &mut ShellState) -> (ExitCode, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = registry
            .run_builtin(&split_into_tokens(line, 64), &mut out, &mut err, state)
            .unwrap()
            .expect("builtin should be recognized");
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_registry_recognizes_only_cd() {
        let registry = BuiltinRegistry::default();
        assert!(registry.is_builtin("cd"));
        assert!(!registry.is_builtin("ls"));
        assert!(!registry.is_builtin("CD"));
        assert!(!registry.is_builtin(""));
    }

    #[test]
    fn test_run_builtin_ignores_unknown_names() {
        let registry = BuiltinRegistry::default();
        let mut state = state_in(stdenv::temp_dir());
        let res = registry
            .run_builtin(&split_into_tokens("ls -l", 64), &mut Vec::new(), &mut Vec::new(), &mut state)
            .unwrap();
        assert_eq!(res, None);
        let res = registry
            .run_builtin(&split_into_tokens("", 64), &mut Vec::new(), &mut Vec::new(), &mut state)
            .unwrap();
        assert_eq!(res, None);
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_abs").expect("failed to create temp dir");
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_in(orig.clone());

        let target = temp.to_string_lossy().to_string();
        let (code, _, err) = run(&BuiltinRegistry::default(), &format!("cd {}", target), &mut state);

        assert_eq!(code, 0);
        assert!(err.is_empty());
        assert_eq!(fs::canonicalize(stdenv::current_dir().unwrap()).unwrap(), temp);
        assert_eq!(state.current_dir, temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_relative_to_state_directory() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_rel").expect("failed to create temp dir");
        fs::create_dir_all(temp.join("inner")).unwrap();
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_in(temp.clone());

        let (code, _, _) = run(&BuiltinRegistry::default(), "cd inner", &mut state);

        assert_eq!(code, 0);
        assert_eq!(state.current_dir, temp.join("inner"));

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_in(orig.clone());

        let name = format!("nonexistent_dir_for_shell_test_{}", std::process::id());
        let (code, _, err) = run(&BuiltinRegistry::default(), &format!("cd {}", name), &mut state);

        assert_eq!(code, 1);
        assert!(err.starts_with(&format!("cd: {}", name)), "got {:?}", err);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(state.current_dir, orig);
    }

    #[test]
    fn test_cd_into_regular_file_errors() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_file").expect("failed to create temp dir");
        let file = temp.join("plain");
        fs::write(&file, "x").unwrap();
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_in(orig.clone());

        let target = file.to_string_lossy().to_string();
        let (code, _, err) = run(&BuiltinRegistry::default(), &format!("cd {}", target), &mut state);

        assert_eq!(code, 1);
        assert!(!err.is_empty());
        assert_eq!(stdenv::current_dir().unwrap(), orig);

        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_without_operand_reports_failure() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_in(orig.clone());
        state.set_var("HOME", "/");

        let (code, _, err) = run(&BuiltinRegistry::default(), "cd", &mut state);

        assert_eq!(code, 1);
        assert_eq!(err, "cd: missing operand\n");
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_cd_help_and_usage_errors() {
        let mut state = state_in(stdenv::temp_dir());
        let registry = BuiltinRegistry::default();

        let (code, out, err) = run(&registry, "cd --help", &mut state);
        assert_eq!(code, 0);
        assert!(out.contains("Usage: cd"), "got {:?}", out);
        assert!(err.is_empty());

        let (code, out, err) = run(&registry, "cd a b", &mut state);
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(!err.is_empty());
    }
}
