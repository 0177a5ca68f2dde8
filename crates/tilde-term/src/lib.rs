// SPDX-License-Identifier: MIT
//
// tilde-term — Terminal control for the tilde editor.
//
// Raw mode, window size discovery, key decoding, and single-write frame
// output, done directly with termios and ANSI escape sequences. There is
// no TUI framework underneath: every byte sent to the terminal passes
// through a `RenderBuffer` and leaves in one write.

#[cfg(not(unix))]
compile_error!("tilde-term talks to termios directly and only builds on Unix");

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod size;
pub mod terminal;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
