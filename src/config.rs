/// Tunables for a shell session.
///
/// The defaults match a conventional interactive shell: a `$ ` prompt, at most
/// 64 arguments per line and the usual 4096-byte `PATH_MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Prompt shown by interactive line sources.
    pub prompt: String,
    /// Tokens beyond this count are dropped from a line.
    pub max_args: usize,
    /// Longest candidate path the resolver will construct.
    pub max_path_len: usize,
}

pub const DEFAULT_PROMPT: &str = "$ ";
pub const DEFAULT_MAX_ARGS: usize = 64;
pub const DEFAULT_MAX_PATH_LEN: usize = 4096;

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_args: DEFAULT_MAX_ARGS,
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }
}
