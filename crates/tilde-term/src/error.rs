// SPDX-License-Identifier: MIT
//
// Error taxonomy for terminal control.
//
// Every failure the terminal layer can hit falls into one of five buckets.
// The binary treats them all as fatal: restore the terminal, print the
// message, exit 1. The single recoverable condition, a read that returned
// no data inside the raw-mode timeout, never becomes an `Error` at all; it
// surfaces as `Ok(None)` from `ByteSource::read_byte` and is retried.

use std::io;

use thiserror::Error;

/// A terminal-layer failure.
#[derive(Debug, Error)]
pub enum Error {
    /// `tcgetattr` failed while capturing the original terminal attributes.
    #[error("failed to query terminal attributes: {0}")]
    TerminalQuery(#[source] io::Error),

    /// `tcsetattr` failed while entering or leaving raw mode.
    #[error("failed to configure terminal attributes: {0}")]
    TerminalConfigure(#[source] io::Error),

    /// Raw mode was requested while another guard still holds it.
    #[error("raw mode is already active in this process")]
    AlreadyActive,

    /// A read or write on the terminal failed.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),

    /// Neither `TIOCGWINSZ` nor the cursor-report probe produced a size.
    #[error("failed to determine window size: {0}")]
    WindowSize(String),
}

impl Error {
    /// Shorthand for a [`WindowSize`](Self::WindowSize) error.
    pub(crate) fn window_size(reason: impl Into<String>) -> Self {
        Self::WindowSize(reason.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

// ─── Tests ───────────────────────────────────────────────────────────────────
