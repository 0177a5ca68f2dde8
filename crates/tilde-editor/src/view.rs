//! View — composes one full frame of the screen.
//!
//! With no buffer to show, every row is a tilde line except the banner row a
//! third of the way down, which carries the centred welcome message. The
//! frame is built into a [`RenderBuffer`] so the terminal sees it in one
//! write:
//!
//! ```text
//! ESC[?25l ESC[H                 hide cursor, home
//! ~ ESC[K \r\n                   tilde rows
//!      Tilde editor ESC[K \r\n   banner row (rows / 3)
//! ~ ESC[K                        last row, no line break
//! ESC[r;cH ESC[?25h              place cursor, show it
//! ```
//!
//! Each row is cleared to its end after its content rather than clearing the
//! whole screen up front, which is what keeps redraws from flickering.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use tilde_term::ansi;
use tilde_term::output::RenderBuffer;
use tilde_term::size::Size;

use crate::cursor::Cursor;

// ---------------------------------------------------------------------------
// Banner layout
// ---------------------------------------------------------------------------

/// The row the banner is drawn on.
#[inline]
#[must_use]
pub const fn banner_row(size: Size) -> usize {
    size.rows as usize / 3
}

/// Truncate `banner` to at most `cols` display columns.
///
/// Cuts between grapheme clusters, so combining marks stay with their base
/// and a wide character that would straddle the edge is dropped whole.
#[must_use]
pub fn fit_to_width(banner: &str, cols: usize) -> &str {
    let mut width = 0;
    for (idx, grapheme) in banner.grapheme_indices(true) {
        let w = grapheme.width();
        if width + w > cols {
            return &banner[..idx];
        }
        width += w;
    }
    banner
}

/// Lay out the banner row: left padding followed by the (possibly
/// truncated) banner. Padding is `(cols - width) / 2` spaces, 0 when the
/// banner fills the row.
pub fn banner_line(out: &mut RenderBuffer, banner: &str, cols: usize) {
    let text = fit_to_width(banner, cols);
    let padding = (cols - text.width()) / 2;
    for _ in 0..padding {
        out.append(b" ");
    }
    out.append(text.as_bytes());
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Compose a full frame: tilde rows, the banner, and the cursor.
///
/// The caller flushes `out` once.
pub fn render_frame(out: &mut RenderBuffer, size: Size, cursor: &Cursor, banner: &str) {
    ansi::cursor_hide(out).ok();
    ansi::cursor_home(out).ok();

    let rows = usize::from(size.rows);
    let cols = usize::from(size.cols);
    let banner_at = banner_row(size);

    for row in 0..rows {
        if row == banner_at {
            banner_line(out, banner, cols);
        } else {
            out.append(b"~");
        }
        ansi::clear_line(out).ok();
        if row + 1 < rows {
            out.append(b"\r\n");
        }
    }

    ansi::cursor_to(out, cursor.row(), cursor.col()).ok();
    ansi::cursor_show(out).ok();
}
