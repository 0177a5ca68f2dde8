// SPDX-License-Identifier: MIT
//
// Event loop — render, read one key, dispatch, repeat.
//
// Everything happens on one thread with no background reader: the loop
// paints a frame, flushes it in one write, then blocks in `read_key` until
// a key arrives. The raw-mode read timeout is the only scheduling primitive
// there is; when it fires with no input, `read_key` just reads again.
//
// Because the frame is painted before every read, what's on screen always
// reflects the state after the last key was handled.
//
// On quit the loop clears the screen and homes the cursor, then returns
// without painting again.

use std::io::Write;

use crate::ansi;
use crate::error::Result;
use crate::input::{ByteSource, Key, read_key};
use crate::output::RenderBuffer;

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Clear the screen and exit the event loop.
    Quit,
}

/// Application interface for the event loop.
///
/// Each iteration the loop calls [`paint`](App::paint), flushes the frame,
/// reads one key and hands it to [`on_key`](App::on_key).
pub trait App {
    /// Handle one decoded key.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_key(&mut self, key: Key) -> Action;

    /// Compose the full frame for the current state into `out`.
    fn paint(&self, out: &mut RenderBuffer);
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop over some tty-like `T`.
///
/// # Example
///
/// ```no_run
/// use tilde_term::event_loop::{Action, App, EventLoop};
/// use tilde_term::input::Key;
/// use tilde_term::output::RenderBuffer;
/// use tilde_term::terminal::Tty;
///
/// struct MyApp;
///
/// impl App for MyApp {
///     fn on_key(&mut self, key: Key) -> Action {
///         if key == Key::ctrl(b'q') {
///             return Action::Quit;
///         }
///         Action::Continue
///     }
///
///     fn paint(&self, out: &mut RenderBuffer) {
///         out.append(b"~");
///     }
/// }
///
/// EventLoop::new(Tty::stdio()).run(&mut MyApp)?;
/// # Ok::<(), tilde_term::Error>(())
/// ```
pub struct EventLoop<T> {
    io: T,
}

impl<T: Write + ByteSource> EventLoop<T> {
    /// Create an event loop that draws to and reads from `io`.
    #[must_use]
    pub const fn new(io: T) -> Self {
        Self { io }
    }

    /// Run until the application returns [`Action::Quit`].
    ///
    /// # Errors
    ///
    /// Returns an error if writing a frame or reading a key fails. The
    /// screen is left as-is; restoring it is the caller's job.
    pub fn run(&mut self, app: &mut impl App) -> Result<()> {
        loop {
            let mut frame = RenderBuffer::new();
            app.paint(&mut frame);
            frame.flush_to(&mut self.io)?;

            let key = read_key(&mut self.io)?;
            tracing::trace!(?key, "key");

            if app.on_key(key) == Action::Quit {
                tracing::debug!("quit requested");
                return self.clear_screen();
            }
        }
    }

    /// Clear the screen and park the cursor top-left, in one write.
    fn clear_screen(&mut self) -> Result<()> {
        let mut out = RenderBuffer::new();
        ansi::clear_screen(&mut out).ok();
        ansi::cursor_home(&mut out).ok();
        out.flush_to(&mut self.io)?;
        Ok(())
    }

    /// Borrow the underlying tty.
    #[inline]
    #[must_use]
    pub const fn get_ref(&self) -> &T {
        &self.io
    }

    /// Take back the underlying tty.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.io
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
