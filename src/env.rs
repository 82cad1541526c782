use crate::command::ExitCode;
use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Process-wide state the shell owns, made explicit.
///
/// The state contains:
/// - `vars`: the environment handed unmodified to every child process.
/// - `current_dir`: the working directory relative names are resolved against.
/// - `last_status`: exit code of the most recently dispatched command.
///
/// Only builtins mutate it; resolution and process spawning just read it.
#[derive(Debug, Clone)]
pub struct ShellState {
    /// Key-value store of environment variables (e.g., PATH, HOME). Kept as
    /// OS strings so non-unicode values reach children untouched.
    pub vars: HashMap<OsString, OsString>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Status of the last command, 0 before anything has run.
    pub last_status: ExitCode,
}

impl ShellState {
    /// Capture the current process state, every variable included.
    pub fn capture() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_vars(stdenv::vars_os(), current_dir)
    }

    /// Build a state from explicit variables and a working directory.
    pub fn with_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>, current_dir: PathBuf) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            current_dir,
            last_status: 0,
        }
    }

    /// Get the value of a variable. Unlike `std::env::var_os` this never
    /// looks at the live process environment.
    pub fn get_var(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.vars.get(key.as_ref()).map(OsString::as_os_str)
    }

    /// Set or override a variable.
    pub fn set_var(&mut self, key: impl Into<OsString>, val: impl Into<OsString>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Remove a variable, returning its previous value.
    pub fn remove_var(&mut self, key: impl AsRef<OsStr>) -> Option<OsString> {
        self.vars.remove(key.as_ref())
    }

    /// Interpret `path` against the shell's working directory.
    pub fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if path.as_os_str().is_empty() {
            self.current_dir.clone()
        } else {
            self.current_dir.join(path)
        }
    }
}
