// SPDX-License-Identifier: MIT
//
// tilde — a screen-oriented terminal text editor.
//
// This is the main binary that wires the two crates together:
//
//   tilde-term   → raw mode, size probe, key decoding, event loop
//   tilde-editor → cursor, frame composition, key dispatch, options
//
// Startup order matters. Raw mode goes on first so the size probe can read
// the terminal's cursor report byte by byte; the probe finishes before the
// event loop starts reading keys, since both share the same input stream.
//
//   options → raw mode → size probe → Editor → EventLoop::run → restore
//
// Logging goes to the file named by TILDE_LOG, never to the terminal being
// drawn on. Without TILDE_LOG no subscriber is installed at all.

use std::fs::OpenOptions;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use tilde_editor::editor::Editor;
use tilde_editor::options::Options;
use tilde_term::ansi;
use tilde_term::event_loop::EventLoop;
use tilde_term::output::RenderBuffer;
use tilde_term::size;
use tilde_term::terminal::{RawMode, Tty};

/// Log file path.
const LOG_VAR: &str = "TILDE_LOG";

/// Log filter directive, e.g. `debug` or `tilde_term=trace`.
const LOG_LEVEL_VAR: &str = "TILDE_LOG_LEVEL";

// ─── Logging ────────────────────────────────────────────────────────────────

fn init_logging() {
    let Some(path) = std::env::var_os(LOG_VAR) else {
        return;
    };

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(e) => {
            // Still in cooked mode here, so stderr is readable.
            eprintln!("tilde: cannot open log file {}: {e}", path.to_string_lossy());
            return;
        }
    };

    let filter = EnvFilter::try_from_env(LOG_LEVEL_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();
    if installed.is_err() {
        eprintln!("tilde: a log subscriber is already installed");
    }
}

// ─── Run ────────────────────────────────────────────────────────────────────

/// Run the editor on `tty` until the quit key, restoring the terminal on
/// the way out.
fn run(mut tty: Tty, options: Options) -> tilde_term::Result<()> {
    let raw = RawMode::enable(tty.input_fd(), options.timing)?;
    let size = size::probe(&mut tty)?;
    tracing::info!(rows = size.rows, cols = size.cols, "starting");

    let mut editor = Editor::new(size, options);
    EventLoop::new(tty).run(&mut editor)?;

    raw.disable()?;
    tracing::info!("clean exit");
    Ok(())
}

/// Best-effort clear and home after a fatal error, so the diagnostic
/// doesn't land in the middle of a half-drawn frame.
fn clear_screen() {
    let mut out = RenderBuffer::new();
    ansi::clear_screen(&mut out).ok();
    ansi::cursor_home(&mut out).ok();
    out.flush_to(&mut Tty::stdio()).ok();
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    init_logging();

    match run(Tty::stdio(), Options::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            clear_screen();
            eprintln!("tilde: {e}");
            std::io::stderr().flush().ok();
            ExitCode::FAILURE
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
