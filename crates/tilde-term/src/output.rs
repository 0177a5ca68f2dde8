// SPDX-License-Identifier: MIT
//
// Frame output buffering.
//
// `RenderBuffer` accumulates every byte of one frame (cursor hides, row
// content, clear-line codes, the final cursor placement) so the whole frame
// reaches the terminal in a single write. Many small writes let the terminal
// paint half-finished frames, which shows up as flicker; one write does not.
//
// The buffer lives for exactly one frame: created empty, appended to in
// order, then consumed by `flush_to`. Nothing carries over between frames.
//
// Growth failure is swallowed. A frame missing some bytes is a garbled
// screen for 100ms; an abort mid-frame is a terminal left in raw mode.

use std::io::{self, Write};

/// Starting capacity. A 200×60 screen of tildes plus escapes fits easily.
const DEFAULT_CAPACITY: usize = 4096;

/// A byte buffer that collects one frame for a single `write()` syscall.
///
/// # Example
///
/// ```
/// use tilde_term::output::RenderBuffer;
///
/// let mut frame = RenderBuffer::new();
/// frame.append(b"\x1b[H");
/// frame.append(b"~");
///
/// let mut screen = Vec::new();
/// frame.flush_to(&mut screen)?;
/// assert_eq!(screen, b"\x1b[H~");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct RenderBuffer {
    buf: Vec<u8>,
}

impl RenderBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Append `bytes` to the end of the frame.
    ///
    /// If the buffer cannot grow, the bytes are dropped and the frame
    /// continues without them.
    pub fn append(&mut self, bytes: &[u8]) {
        if self.buf.try_reserve(bytes.len()).is_err() {
            tracing::trace!(len = bytes.len(), "render buffer growth failed, dropping bytes");
            return;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write the whole frame to `w` in one `write_all`, then drop the buffer.
    ///
    /// An empty frame writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `w` fails.
    pub fn flush_to(self, w: &mut impl Write) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        w.write_all(&self.buf)?;
        w.flush()
    }
}

impl Write for RenderBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
