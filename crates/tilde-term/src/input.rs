// SPDX-License-Identifier: MIT
//
// Terminal input decoding.
//
// Turns raw input bytes into logical keys. Plain bytes map straight to
// `Key::Char` or `Key::Ctrl`; the interesting part is the escape byte.
//
// # Escape vs escape-sequence ambiguity
//
// A bare `ESC` (0x1B) is either the Escape key or the first byte of a
// sequence like `ESC [ A` (arrow up). Terminals emit a whole sequence in one
// burst, so after an ESC we look ahead: if the follow-up bytes arrive within
// the raw-mode read timeout it's a sequence, and if a read comes back empty
// it was a lone Escape.
//
// The lookahead is at most three bytes and nothing is remembered between
// calls. Sequences we don't recognise collapse to `Key::Escape`; their
// unread tail (if any) is picked up by later reads as ordinary keys.
//
// Recognised sequences:
//
//   ESC [ A/B/C/D      arrows           ESC [ H / ESC [ F   home / end
//   ESC [ 1~ / 7~      home             ESC [ 4~ / 8~       end
//   ESC [ 3~           delete           ESC [ 5~ / 6~       page up / down
//   ESC O H / ESC O F  home / end

use std::collections::VecDeque;
use std::io;

use crate::error::Result;

/// The escape byte.
pub const ESC: u8 = 0x1b;

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable byte (anything that isn't a control byte).
    Char(u8),
    /// A control byte: `0x00..=0x1F` or DEL (`0x7F`), raw value.
    Ctrl(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
    Delete,
    /// A lone Escape, or an escape sequence we don't recognise.
    Escape,
}

impl Key {
    /// The key produced by holding Ctrl with `letter` (`Key::ctrl(b'q')` is 0x11).
    #[inline]
    #[must_use]
    pub const fn ctrl(letter: u8) -> Self {
        Self::Ctrl(letter & 0x1f)
    }

    /// Classify a single non-escape byte.
    #[inline]
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        if byte < 0x20 || byte == 0x7f {
            Self::Ctrl(byte)
        } else {
            Self::Char(byte)
        }
    }
}

// ─── ByteSource ─────────────────────────────────────────────────────────────

/// Something keys can be read from, one byte at a time.
///
/// `Ok(None)` means "no data yet": the read timed out or would block. It is
/// not an error. Callers decide whether to wait again.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns an error for any read failure other than "no data yet".
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Scripted input: pops from the front, reports "no data" when empty.
impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

// ─── Decoding ───────────────────────────────────────────────────────────────

/// Block until one key has been read from `src`.
///
/// Waits through "no data yet" results for the first byte. During the
/// escape lookahead a timeout or a failed read both end the sequence and
/// yield [`Key::Escape`].
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if reading the first byte fails.
pub fn read_key<S: ByteSource + ?Sized>(src: &mut S) -> Result<Key> {
    let first = loop {
        if let Some(byte) = src.read_byte()? {
            break byte;
        }
    };

    if first != ESC {
        return Ok(Key::from_byte(first));
    }

    Ok(decode_escape(|| match src.read_byte() {
        Ok(byte) => byte,
        Err(err) => {
            tracing::trace!(%err, "escape lookahead read failed");
            None
        }
    }))
}

/// Decode the first key in `bytes`.
///
/// The same state machine as [`read_key`], run over a slice: running out of
/// bytes plays the part of a read timeout. Returns `None` for an empty
/// slice.
#[must_use]
pub fn decode(bytes: &[u8]) -> Option<Key> {
    let (&first, rest) = bytes.split_first()?;
    if first != ESC {
        return Some(Key::from_byte(first));
    }
    let mut rest = rest.iter().copied();
    Some(decode_escape(|| rest.next()))
}

/// Everything after the ESC byte. `next` yields `None` on timeout.
fn decode_escape(mut next: impl FnMut() -> Option<u8>) -> Key {
    let Some(first) = next() else {
        return Key::Escape;
    };
    let Some(second) = next() else {
        return Key::Escape;
    };

    let key = match (first, second) {
        (b'[', digit @ b'1'..=b'9') => match next() {
            Some(b'~') => tilde_key(digit),
            _ => None,
        },
        (b'[', letter) => csi_letter_key(letter),
        (b'O', letter) => ss3_key(letter),
        _ => None,
    };

    key.unwrap_or_else(|| {
        tracing::trace!(first, second, "unrecognised escape sequence");
        Key::Escape
    })
}

/// `ESC [ <digit> ~`
const fn tilde_key(digit: u8) -> Option<Key> {
    match digit {
        b'1' | b'7' => Some(Key::Home),
        b'3' => Some(Key::Delete),
        b'4' | b'8' => Some(Key::End),
        b'5' => Some(Key::PageUp),
        b'6' => Some(Key::PageDown),
        _ => None,
    }
}

/// `ESC [ <letter>`
const fn csi_letter_key(letter: u8) -> Option<Key> {
    match letter {
        b'A' => Some(Key::ArrowUp),
        b'B' => Some(Key::ArrowDown),
        b'C' => Some(Key::ArrowRight),
        b'D' => Some(Key::ArrowLeft),
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        _ => None,
    }
}

/// `ESC O <letter>`
const fn ss3_key(letter: u8) -> Option<Key> {
    match letter {
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        _ => None,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Helper: decode bytes, expecting exactly one key.
    fn key(bytes: &[u8]) -> Key {
        decode(bytes).expect("non-empty input")
    }

    /// Helper: run `read_key` over scripted input.
    fn read(bytes: &[u8]) -> Key {
        let mut src: VecDeque<u8> = bytes.iter().copied().collect();
        read_key(&mut src).unwrap()
    }

    /// Source that yields a scripted mix of bytes, timeouts and errors.
    struct Script(VecDeque<io::Result<Option<u8>>>);

    impl ByteSource for Script {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn printable_ascii() {
        assert_eq!(key(b"a"), Key::Char(b'a'));
        assert_eq!(key(b"~"), Key::Char(b'~'));
        assert_eq!(key(b" "), Key::Char(b' '));
    }

    #[test]
    fn only_first_key_is_decoded() {
        assert_eq!(key(b"ab"), Key::Char(b'a'));
    }

    #[test]
    fn control_bytes() {
        assert_eq!(key(b"\x00"), Key::Ctrl(0));
        assert_eq!(key(b"\x11"), Key::Ctrl(0x11));
        assert_eq!(key(b"\r"), Key::Ctrl(b'\r'));
        assert_eq!(key(b"\x7f"), Key::Ctrl(0x7f));
    }

    #[test]
    fn high_bytes_are_chars() {
        assert_eq!(key(b"\xc3"), Key::Char(0xc3));
    }

    #[test]
    fn ctrl_helper_masks_letter() {
        assert_eq!(Key::ctrl(b'q'), Key::Ctrl(0x11));
        assert_eq!(Key::ctrl(b'Q'), Key::Ctrl(0x11));
        assert_eq!(Key::ctrl(b'a'), Key::Ctrl(0x01));
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        assert_eq!(decode(b""), None);
    }

    // ── CSI letters ─────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(key(b"\x1b[A"), Key::ArrowUp);
        assert_eq!(key(b"\x1b[B"), Key::ArrowDown);
        assert_eq!(key(b"\x1b[C"), Key::ArrowRight);
        assert_eq!(key(b"\x1b[D"), Key::ArrowLeft);
    }

    #[test]
    fn csi_home_end() {
        assert_eq!(key(b"\x1b[H"), Key::Home);
        assert_eq!(key(b"\x1b[F"), Key::End);
    }

    #[test]
    fn csi_unknown_letter_is_escape() {
        assert_eq!(key(b"\x1b[Z"), Key::Escape);
    }

    // ── CSI digit ~ ─────────────────────────────────────────────────────

    #[test]
    fn tilde_sequences() {
        assert_eq!(key(b"\x1b[1~"), Key::Home);
        assert_eq!(key(b"\x1b[3~"), Key::Delete);
        assert_eq!(key(b"\x1b[4~"), Key::End);
        assert_eq!(key(b"\x1b[5~"), Key::PageUp);
        assert_eq!(key(b"\x1b[6~"), Key::PageDown);
        assert_eq!(key(b"\x1b[7~"), Key::Home);
        assert_eq!(key(b"\x1b[8~"), Key::End);
    }

    #[test]
    fn unmapped_tilde_digits_are_escape() {
        assert_eq!(key(b"\x1b[2~"), Key::Escape);
        assert_eq!(key(b"\x1b[9~"), Key::Escape);
    }

    #[test]
    fn digit_without_tilde_is_escape() {
        assert_eq!(key(b"\x1b[5A"), Key::Escape);
    }

    #[test]
    fn digit_then_timeout_is_escape() {
        assert_eq!(key(b"\x1b[3"), Key::Escape);
    }

    #[test]
    fn zero_digit_is_not_a_tilde_sequence() {
        // '0' is outside 1..=9, so it's treated as an (unknown) letter.
        assert_eq!(key(b"\x1b[0~"), Key::Escape);
    }

    // ── SS3 ─────────────────────────────────────────────────────────────

    #[test]
    fn ss3_home_end() {
        assert_eq!(key(b"\x1bOH"), Key::Home);
        assert_eq!(key(b"\x1bOF"), Key::End);
    }

    #[test]
    fn ss3_other_letters_are_escape() {
        assert_eq!(key(b"\x1bOA"), Key::Escape);
        assert_eq!(key(b"\x1bOP"), Key::Escape);
    }

    // ── Lone / truncated escape ─────────────────────────────────────────

    #[test]
    fn lone_escape() {
        assert_eq!(key(b"\x1b"), Key::Escape);
    }

    #[test]
    fn escape_then_one_byte() {
        assert_eq!(key(b"\x1b["), Key::Escape);
    }

    #[test]
    fn escape_then_unrelated_bytes() {
        assert_eq!(key(b"\x1bxy"), Key::Escape);
    }

    // ── read_key ────────────────────────────────────────────────────────

    #[test]
    fn read_key_plain() {
        assert_eq!(read(b"j"), Key::Char(b'j'));
        assert_eq!(read(b"\x11"), Key::Ctrl(0x11));
    }

    #[test]
    fn read_key_sequences() {
        assert_eq!(read(b"\x1b[A"), Key::ArrowUp);
        assert_eq!(read(b"\x1b[3~"), Key::Delete);
        assert_eq!(read(b"\x1b[5~"), Key::PageUp);
    }

    #[test]
    fn read_key_lone_escape_times_out() {
        assert_eq!(read(b"\x1b"), Key::Escape);
    }

    #[test]
    fn read_key_consumes_only_one_key() {
        let mut src: VecDeque<u8> = b"\x1b[Bx".iter().copied().collect();
        assert_eq!(read_key(&mut src).unwrap(), Key::ArrowDown);
        assert_eq!(read_key(&mut src).unwrap(), Key::Char(b'x'));
        assert!(src.is_empty());
    }

    #[test]
    fn read_key_retries_until_data() {
        let mut src = Script(VecDeque::from([Ok(None), Ok(None), Ok(None), Ok(Some(b'k'))]));
        assert_eq!(read_key(&mut src).unwrap(), Key::Char(b'k'));
    }

    #[test]
    fn read_key_timeout_mid_sequence_is_escape() {
        let mut src = Script(VecDeque::from([Ok(Some(ESC)), Ok(Some(b'[')), Ok(None), Ok(Some(b'A'))]));
        assert_eq!(read_key(&mut src).unwrap(), Key::Escape);
        // The late byte is left for the next read.
        assert_eq!(read_key(&mut src).unwrap(), Key::Char(b'A'));
    }

    #[test]
    fn read_key_first_byte_error_propagates() {
        let mut src = Script(VecDeque::from([Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "closed",
        ))]));
        assert!(matches!(read_key(&mut src), Err(Error::Io(_))));
    }

    #[test]
    fn read_key_lookahead_error_is_escape() {
        let mut src = Script(VecDeque::from([
            Ok(Some(ESC)),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")),
        ]));
        assert_eq!(read_key(&mut src).unwrap(), Key::Escape);
    }

    #[test]
    fn read_key_through_mut_reference() {
        let mut src: VecDeque<u8> = b"\x1bOF".iter().copied().collect();
        let mut by_ref = &mut src;
        assert_eq!(read_key(&mut by_ref).unwrap(), Key::End);
    }
}
