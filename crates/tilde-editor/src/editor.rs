//! Editor — the state the event loop drives.
//!
//! `Editor` owns the screen size, the cursor and the options, and
//! implements [`App`] so an [`EventLoop`](tilde_term::event_loop::EventLoop)
//! can run it. Each key flows through:
//!
//! ```text
//! read_key → on_key → handle_key → cursor movement / quit
//! paint    → view::render_frame → RenderBuffer → one write
//! ```

use tilde_term::event_loop::{Action, App};
use tilde_term::input::Key;
use tilde_term::output::RenderBuffer;
use tilde_term::size::Size;

use crate::cursor::{Cursor, Direction};
use crate::options::Options;
use crate::view;

/// Editor state: screen geometry, cursor, and configuration.
#[derive(Debug, Clone)]
pub struct Editor {
    size: Size,
    cursor: Cursor,
    options: Options,
}

impl Editor {
    /// An editor for a screen of `size`, cursor at the top-left.
    #[must_use]
    pub const fn new(size: Size, options: Options) -> Self {
        Self {
            size,
            cursor: Cursor::new(),
            options,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    // -- Dispatch -----------------------------------------------------------

    /// Apply one key to the editor state.
    pub fn handle_key(&mut self, key: Key) -> Action {
        if key == self.options.quit_key {
            return Action::Quit;
        }

        let size = self.size;
        let page = usize::from(size.rows);
        match key {
            Key::ArrowUp => self.cursor.step(Direction::Up, size),
            Key::ArrowDown => self.cursor.step(Direction::Down, size),
            Key::ArrowLeft => self.cursor.step(Direction::Left, size),
            Key::ArrowRight => self.cursor.step(Direction::Right, size),
            Key::PageUp => self.cursor.move_up(page),
            Key::PageDown => self.cursor.move_down(page, size),
            Key::Home => self.cursor.move_to_line_start(),
            Key::End => self.cursor.move_to_line_end(size),
            // No text to delete yet.
            Key::Delete => {}
            Key::Char(_) | Key::Ctrl(_) | Key::Escape => {
                tracing::trace!(?key, "unbound key");
            }
        }
        Action::Continue
    }
}

impl App for Editor {
    fn on_key(&mut self, key: Key) -> Action {
        self.handle_key(key)
    }

    fn paint(&self, out: &mut RenderBuffer) {
        view::render_frame(out, self.size, &self.cursor, &self.options.banner);
    }
}
