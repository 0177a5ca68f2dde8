// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Window size discovery.
//
// The fast path is `ioctl(TIOCGWINSZ)`. Some environments (serial consoles,
// a few multiplexers, terminals behind odd ptys) answer that with an error
// or a 0×0 size, so there's a fallback that asks the terminal itself:
//
//   1. Push the cursor as far right and down as it will go.
//   2. Ask where it ended up (`ESC [ 6n`).
//   3. Read the reply `ESC [ rows ; cols R` off the input stream.
//
// The fallback shares the input stream with key presses, so it has to run
// before the event loop starts reading keys.

use std::io::Write;
use std::os::fd::RawFd;

use crate::ansi;
use crate::error::{Error, Result};
use crate::input::{ByteSource, ESC};
use crate::terminal::Tty;

/// Maximum cursor-report length read before giving up on the `R`.
const REPORT_CAP: usize = 31;

/// Consecutive empty reads tolerated between report bytes. With the default
/// 100ms read timeout this is about one second.
const REPORT_TIMEOUTS: usize = 10;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells. Both are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

// ─── Probe ──────────────────────────────────────────────────────────────────

/// Query the size of the terminal behind `fd` via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if the query fails or reports a zero dimension.
#[must_use]
pub fn get_size(fd: RawFd) -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            rows: ws.ws_row,
            cols: ws.ws_col,
        })
    } else {
        None
    }
}

/// Determine the terminal size, falling back to a cursor-report probe.
///
/// # Errors
///
/// Returns [`Error::WindowSize`] if the ioctl is unusable and the probe
/// reply is missing or malformed, or [`Error::Io`] if the probe can't be
/// written.
pub fn probe(tty: &mut Tty) -> Result<Size> {
    if let Some(size) = get_size(tty.output_fd()) {
        return Ok(size);
    }
    tracing::debug!("TIOCGWINSZ unavailable, probing with a cursor position report");
    probe_via_cursor(tty)
}

/// Discover the size by moving the cursor to the far corner and asking
/// the terminal where it is.
///
/// # Errors
///
/// Same as [`probe`].
pub fn probe_via_cursor<T: Write + ByteSource>(io: &mut T) -> Result<Size> {
    ansi::cursor_to_far_corner(io)?;
    ansi::request_cursor_position(io)?;
    io.flush()?;

    let reply = read_cursor_report(io)?;
    let size = parse_cursor_report(&reply)?;
    tracing::debug!(rows = size.rows, cols = size.cols, "cursor report");
    Ok(size)
}

/// Collect reply bytes up to and including `R`, at most [`REPORT_CAP`].
fn read_cursor_report<S: ByteSource + ?Sized>(src: &mut S) -> Result<Vec<u8>> {
    let mut reply = Vec::with_capacity(REPORT_CAP);
    let mut idle = 0;

    while reply.len() < REPORT_CAP {
        match src.read_byte()? {
            Some(byte) => {
                idle = 0;
                reply.push(byte);
                if byte == b'R' {
                    break;
                }
            }
            None => {
                idle += 1;
                if idle >= REPORT_TIMEOUTS {
                    break;
                }
            }
        }
    }

    Ok(reply)
}

/// Parse a cursor position report: `ESC [ rows ; cols R`.
///
/// # Errors
///
/// Returns [`Error::WindowSize`] if the prefix or terminator is missing,
/// either field isn't a number, or either field is zero.
pub fn parse_cursor_report(reply: &[u8]) -> Result<Size> {
    let body = reply
        .strip_prefix(&[ESC, b'['])
        .ok_or_else(|| Error::window_size("cursor report does not start with ESC ["))?;
    let body = body
        .strip_suffix(b"R")
        .ok_or_else(|| Error::window_size("cursor report is missing the `R` terminator"))?;

    let split = body
        .iter()
        .position(|&b| b == b';')
        .ok_or_else(|| Error::window_size("cursor report has no `;` separator"))?;
    let rows = parse_field(&body[..split])
        .ok_or_else(|| Error::window_size("cursor report row is not a number"))?;
    let cols = parse_field(&body[split + 1..])
        .ok_or_else(|| Error::window_size("cursor report column is not a number"))?;

    if rows == 0 || cols == 0 {
        return Err(Error::window_size("cursor report has a zero dimension"));
    }
    Ok(Size { rows, cols })
}

/// Parse a non-empty run of ASCII digits that fits in a `u16`.
fn parse_field(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u16, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u16::from(b - b'0'))
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
