// SPDX-License-Identifier: MIT
//
// kilo — a small modal terminal text editor.
//
// This is the binary that wires the two crates together:
//
//   kilo-term   → raw mode, stdin reader thread, event loop, output buffer
//   kilo-editor → rows, cursor, keymaps, search, prompt, viewport, session
//
// The Session implements kilo-term's App trait. Each scalar flows through:
//
//   stdin → reader thread → UTF-8 decode → on_input → interpreter → dispatch
//   render → viewport → output buffer → one write per frame
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text rows                    │  ← rows - 2
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row
//   ├──────────────────────────────┤
//   │ message bar / prompt         │  ← 1 row
//   └──────────────────────────────┘

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use kilo_editor::config::Config;
use kilo_editor::error::{Error, Result};
use kilo_editor::session::Session;
use kilo_term::event_loop::EventLoop;

/// Log file path, used when `--log` is absent.
const LOG_ENV: &str = "KILO_LOG";

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "kilo=debug";

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "kilo", version, about = "A small modal terminal text editor")]
struct Args {
    /// File to open. Missing files start empty and are created on save.
    file: Option<PathBuf>,

    /// Write trace output to this file (stdout is the editor).
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Don't color digits.
    #[arg(long)]
    no_highlight: bool,

    /// Ctrl-Q presses needed to quit with unsaved changes.
    #[arg(long, value_name = "N", default_value_t = kilo_editor::status::DEFAULT_QUIT_TIMES)]
    quit_times: u32,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            quit_times: self.quit_times,
            highlight_digits: !self.no_highlight,
            ..Config::default()
        }
    }

    fn log_path(&self) -> Option<PathBuf> {
        self.log
            .clone()
            .or_else(|| env::var_os(LOG_ENV).map(PathBuf::from))
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Install a file subscriber. The guard must live until exit so buffered
/// lines get flushed.
fn init_logging(path: &Path) -> Option<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name()?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run(args: &Args) -> Result<()> {
    let mut event_loop = EventLoop::new().map_err(Error::Terminal)?;
    let mut session = Session::open(args.file.as_deref(), event_loop.size(), args.config());
    tracing::info!(
        file = ?args.file,
        size = ?event_loop.size(),
        "startup"
    );
    event_loop.run(&mut session).map_err(Error::Terminal)?;
    tracing::info!("shutdown");
    Ok(())
}

fn main() {
    let args = Args::parse();
    let _log_guard = args.log_path().as_deref().and_then(init_logging);

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "fatal");
        eprintln!("kilo: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["kilo"]).unwrap();
        assert_eq!(args.file, None);
        assert_eq!(args.config(), Config::default());
    }

    #[test]
    fn file_and_flags() {
        let args = Args::try_parse_from([
            "kilo",
            "notes.txt",
            "--no-highlight",
            "--quit-times",
            "1",
            "--log",
            "/tmp/kilo.log",
        ])
        .unwrap();
        assert_eq!(args.file, Some(PathBuf::from("notes.txt")));
        assert_eq!(args.log, Some(PathBuf::from("/tmp/kilo.log")));

        let config = args.config();
        assert_eq!(config.quit_times, 1);
        assert!(!config.highlight_digits);
    }

    #[test]
    fn rejects_bad_quit_times() {
        assert!(Args::try_parse_from(["kilo", "--quit-times", "lots"]).is_err());
    }

    #[test]
    fn rejects_extra_positional() {
        assert!(Args::try_parse_from(["kilo", "a", "b"]).is_err());
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
