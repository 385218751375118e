//! husk - a minimal raw-mode terminal front-end.
//!
//! Puts the controlling terminal into raw mode, polls for keypresses, and
//! quits on Ctrl-Q, clearing the screen and restoring the terminal on the
//! way out. Every other key is reserved for future dispatch.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use husk::input::{self, Action};
use husk::screen;
use husk::terminal::RawMode;

#[derive(Parser)]
#[command(name = "husk", version, about = "A minimal raw-mode terminal front-end")]
struct Cli {
    /// Write tracing output to this file. Logging never goes to the
    /// terminal itself, which stays reserved for the escape protocol.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = run(&cli);

    // The escape protocol runs on the quit path and on every fatal path,
    // always erase-display first, cursor-home second.
    let _ = screen::clear(&mut io::stdout());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("husk: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the front-end. Raw mode is released on every path out of here:
/// explicitly on quit, via the guard's drop when an error propagates.
fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let raw = RawMode::enable(io::stdin()).context("enabling raw mode")?;
    debug!("raw mode enabled");

    let mut keys = io::stdin();
    loop {
        match input::process_keypress(&mut keys).context("reading from stdin")? {
            Action::Quit => break,
            Action::Ignore => {}
        }
    }

    debug!("quit requested, restoring terminal");
    raw.disable().context("disabling raw mode")
}

/// Route tracing to a file. A subscriber writing to stdout or stderr would
/// fight the raw-mode display, so logging is file-only and opt-in.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    debug!("logging initialized");
    Ok(())
}
