//! A tiny line-oriented command shell.
//!
//! Each input line is split on whitespace into an [`ArgumentVector`], checked
//! against the in-process builtins, and otherwise resolved through the `PATH`
//! search and run as a child process that the shell waits for before reading
//! the next line. There is no quoting, piping or expansion.
//!
//! The main entry point is [`Dispatcher`], which owns the [`ShellState`] and
//! runs one line at a time. [`repl`] drives a dispatcher from any
//! [`LineSource`] until end of input.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
mod interpreter;
mod io_adapters;
mod lexer;
mod process;

pub use builtin::BuiltinRegistry;
pub use config::ShellConfig;
pub use env::ShellState;
pub use error::{ResolveError, ShellError};
pub use external::{PathResolver, ResolvedExecutable};
pub use interpreter::{Dispatcher, repl};
pub use io_adapters::{EditorLines, LineSource, ReaderLines};
pub use lexer::{ArgumentVector, split_into_tokens};
pub use process::{ExitOutcome, Launcher, ProcessRunner};
