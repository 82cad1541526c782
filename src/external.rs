use crate::env::ShellState;
use crate::error::ResolveError;
use std::fs;
use std::path::{Path, PathBuf};

/// A name containing this character is taken as a path and never searched for.
pub const PATH_SEPARATOR: char = '/';

/// A command that was confirmed to be executable when it was resolved.
///
/// Nothing stops the file from changing between resolution and exec; the
/// runner reports such failures like any other exec error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExecutable {
    name: String,
    path: PathBuf,
}

impl ResolvedExecutable {
    pub(crate) fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }

    /// The command name exactly as typed. Passed to the child as `argv[0]`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute location of the executable.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Turns command names into executables the way a typical shell would.
///
/// Behavior:
/// - Name containing `/` (e.g. `/bin/ls`, `./prog`, `bin/tool`): checked as is,
///   relative to the shell's working directory. `PATH` is not consulted.
/// - Bare name: each `PATH` entry is tried in order and the first executable
///   candidate wins. An empty entry means the working directory. Candidates
///   longer than the limit are skipped.
/// - No `PATH` variable: nothing is found.
#[derive(Debug, Clone)]
pub struct PathResolver {
    max_path_len: usize,
}

impl PathResolver {
    pub fn new(max_path_len: usize) -> Self {
        Self { max_path_len }
    }

    /// Resolve `command` against the search path held in `state`.
    ///
    /// `PATH` is re-read on every call since builtins may have changed it.
    pub fn resolve(
        &self,
        command: &str,
        state: &ShellState,
    ) -> Result<ResolvedExecutable, ResolveError> {
        if command.is_empty() {
            return Err(ResolveError::NotFound(command.to_string()));
        }

        if command.contains(PATH_SEPARATOR) {
            let path = self.bounded(state.absolutize(Path::new(command)))?;
            return match check_access(&path) {
                Access::Executable => Ok(self.found(command, path)),
                Access::NotExecutable => Err(ResolveError::NotExecutable(PathBuf::from(command))),
                Access::Missing => Err(ResolveError::NotFound(command.to_string())),
            };
        }

        let Some(search_paths) = state.get_var("PATH") else {
            tracing::debug!(command, "PATH is not set");
            return Err(ResolveError::NotFound(command.to_string()));
        };

        // First overlong candidate, reported only if nothing else matches.
        let mut too_long = None;
        for dir in std::env::split_paths(search_paths) {
            let candidate = match self.bounded(state.absolutize(&dir).join(command)) {
                Ok(candidate) => candidate,
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "skipping search path entry");
                    if too_long.is_none() {
                        too_long = Some(e);
                    }
                    continue;
                }
            };
            tracing::trace!(candidate = %candidate.display(), "checking");
            if check_access(&candidate) == Access::Executable {
                return Ok(self.found(command, candidate));
            }
        }

        Err(too_long.unwrap_or_else(|| ResolveError::NotFound(command.to_string())))
    }

    fn found(&self, command: &str, path: PathBuf) -> ResolvedExecutable {
        tracing::debug!(command, path = %path.display(), "resolved");
        ResolvedExecutable::new(command, path)
    }

    fn bounded(&self, path: PathBuf) -> Result<PathBuf, ResolveError> {
        if path.as_os_str().len() > self.max_path_len {
            Err(ResolveError::PathTooLong {
                path,
                max: self.max_path_len,
            })
        } else {
            Ok(path)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Executable,
    NotExecutable,
    Missing,
}

/// Regular file (symlinks followed) with any execute bit set.
#[cfg(unix)]
fn check_access(path: &Path) -> Access {
    use std::os::unix::fs::PermissionsExt;
    match fs::metadata(path) {
        Err(_) => Access::Missing,
        Ok(m) if m.is_file() && m.permissions().mode() & 0o111 != 0 => Access::Executable,
        Ok(_) => Access::NotExecutable,
    }
}

#[cfg(not(unix))]
fn check_access(path: &Path) -> Access {
    match fs::metadata(path) {
        Err(_) => Access::Missing,
        Ok(m) if m.is_file() => Access::Executable,
        Ok(_) => Access::NotExecutable,
    }
}
