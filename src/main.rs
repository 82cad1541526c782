use anyhow::Result;
use argh::FromArgs;
use simple_shell::config::{DEFAULT_MAX_ARGS, DEFAULT_MAX_PATH_LEN, DEFAULT_PROMPT};
use simple_shell::{Dispatcher, EditorLines, LineSource, ReaderLines, ShellConfig, ShellState, repl};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(FromArgs)]
/// A minimal command shell: reads lines from stdin and runs them.
struct Options {
    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt shown when stdin is a terminal
    prompt: String,

    #[argh(option, default = "DEFAULT_MAX_ARGS")]
    /// maximum number of words kept from a line; the rest are dropped
    max_args: usize,

    #[argh(option, default = "DEFAULT_MAX_PATH_LEN")]
    /// maximum length in bytes of a resolved command path
    max_path_len: usize,
}

impl From<Options> for ShellConfig {
    fn from(opts: Options) -> Self {
        ShellConfig {
            prompt: opts.prompt,
            max_args: opts.max_args,
            max_path_len: opts.max_path_len,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(config: ShellConfig) -> Result<()> {
    let mut dispatcher = Dispatcher::new(&config, ShellState::capture());

    let mut source: Box<dyn LineSource> = if io::stdin().is_terminal() {
        Box::new(EditorLines::new(config.prompt.clone())?)
    } else {
        Box::new(ReaderLines::new(io::stdin().lock()))
    };

    repl(
        &mut dispatcher,
        source.as_mut(),
        &mut io::stdout(),
        &mut io::stderr(),
    )?;
    Ok(())
}

fn main() -> ExitCode {
    let config = ShellConfig::from(argh::from_env::<Options>());
    init_tracing();

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("simple_shell: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
