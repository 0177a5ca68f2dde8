// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode with RAII cleanup, and the tty handle.
//
// Safety: termios calls and fd reads/writes go through libc, so this
// module allows `unsafe`. Each block wraps exactly one call.
#![allow(unsafe_code)]
//
// `RawMode` is the only way into raw mode and the only way out. Enabling it
// captures the original attributes; the guard puts them back when it is
// disabled or dropped, so every exit path (normal quit, an error bubbling out
// of `main`, a panic) leaves the terminal in canonical mode.
//
// On panic the guard's `Drop` only runs during unwinding, after the panic
// message has printed. The hook restores the attributes from a global
// backup first, so the message lands on a terminal that echoes and handles
// newlines again.
//
// Raw mode is a property of the terminal device, not of the handle, so at
// most one guard exists per process.

use std::io::{self, Write};
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use crate::error::{Error, Result};
use crate::input::ByteSource;

// ─── Read Timing ────────────────────────────────────────────────────────────

/// `VMIN` / `VTIME` settings applied while in raw mode.
///
/// The defaults make `read()` return as soon as one byte arrives, or after
/// 100ms with nothing. The timeout is what lets a bare Escape keypress be
/// told apart from the start of an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTiming {
    /// Minimum bytes before `read()` returns (`VMIN`).
    pub min_bytes: u8,
    /// Read timeout in tenths of a second (`VTIME`).
    pub timeout_deciseconds: u8,
}

impl Default for ReadTiming {
    fn default() -> Self {
        Self {
            min_bytes: 0,
            timeout_deciseconds: 1,
        }
    }
}

// ─── Tty ────────────────────────────────────────────────────────────────────

/// The terminal's input/output file descriptor pair.
///
/// Writes go straight to `write(2)` with no userspace buffering, so a
/// [`RenderBuffer`](crate::output::RenderBuffer) flushed into a `Tty` is one
/// syscall. Reads are single bytes and honour the raw-mode timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tty {
    input: RawFd,
    output: RawFd,
}

impl Tty {
    /// Standard input and standard output.
    #[must_use]
    pub const fn stdio() -> Self {
        Self {
            input: libc::STDIN_FILENO,
            output: libc::STDOUT_FILENO,
        }
    }

    /// A tty over arbitrary descriptors. The caller keeps ownership.
    #[must_use]
    pub const fn from_fds(input: RawFd, output: RawFd) -> Self {
        Self { input, output }
    }

    /// Descriptor keys are read from.
    #[inline]
    #[must_use]
    pub const fn input_fd(&self) -> RawFd {
        self.input
    }

    /// Descriptor frames are written to.
    #[inline]
    #[must_use]
    pub const fn output_fd(&self) -> RawFd {
        self.output
    }
}

impl Write for Tty {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            let n = unsafe { libc::write(self.output, buf.as_ptr().cast(), buf.len()) };
            if n >= 0 {
                #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
                let written = n as usize;
                return Ok(written);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ByteSource for Tty {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(self.input, (&raw mut byte).cast(), 1) };
        match n {
            1 => Ok(Some(byte)),
            // VTIME expired with nothing to read.
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Set while a [`RawMode`] guard is alive.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Global backup of the original termios for panic recovery.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't reach
/// it, so it restores from this copy instead.
static TERMIOS_BACKUP: Mutex<Option<(RawFd, libc::termios)>> = Mutex::new(None);

/// Show the cursor, clear the screen, home the cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[?25h\x1b[2J\x1b[H";

/// The hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

fn set_backup(value: Option<(RawFd, libc::termios)>) {
    if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
        *guard = value;
    }
}

/// Restore termios from the global backup. Best-effort, ignores errors.
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some((fd, ref original)) = *guard {
            unsafe {
                let _ = libc::tcsetattr(fd, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Install a panic hook that restores the terminal before printing the error.
///
/// Writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing Rust's stdout
/// lock, which the panicking frame may hold), restores termios, then
/// delegates to the original hook.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if RAW_MODE_ACTIVE.load(Ordering::SeqCst) {
                unsafe {
                    let _ = libc::write(
                        libc::STDOUT_FILENO,
                        EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
                        EMERGENCY_RESTORE.len(),
                    );
                }
                restore_termios_from_backup();
            }
            original(info);
        }));
    });
}

// ─── Attribute Helpers ──────────────────────────────────────────────────────

/// Read the current attributes of `fd`.
fn get_attrs(fd: RawFd) -> io::Result<libc::termios> {
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &raw mut termios) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(termios)
    }
}

/// Apply `termios` to `fd`, discarding unread input (`TCSAFLUSH`).
fn set_attrs(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    unsafe {
        if libc::tcsetattr(fd, libc::TCSAFLUSH, termios) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Derive the raw attribute set from `original`.
///
/// Turns off echo, line buffering, extended input processing (Ctrl-V),
/// signal keys (Ctrl-C, Ctrl-Z), break-to-SIGINT, CR→NL translation, parity
/// checking, 8th-bit stripping, software flow control (Ctrl-S, Ctrl-Q) and
/// output post-processing; forces 8-bit characters and applies `timing`.
#[must_use]
pub fn raw_attrs(original: &libc::termios, timing: ReadTiming) -> libc::termios {
    let mut raw = *original;
    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    raw.c_cc[libc::VMIN] = timing.min_bytes;
    raw.c_cc[libc::VTIME] = timing.timeout_deciseconds;
    raw
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw mode guard with RAII cleanup.
///
/// # Example
///
/// ```no_run
/// use tilde_term::terminal::{RawMode, ReadTiming, Tty};
///
/// let tty = Tty::stdio();
/// let raw = RawMode::enable(tty.input_fd(), ReadTiming::default())?;
/// // ... render frames, read keys ...
/// raw.disable()?;
/// # Ok::<(), tilde_term::Error>(())
/// ```
pub struct RawMode {
    fd: RawFd,
    /// Attributes captured before raw mode was entered.
    original: libc::termios,
    restored: bool,
}

impl RawMode {
    /// Enter raw mode on `fd`.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyActive`] if another guard is alive.
    /// - [`Error::TerminalQuery`] if the current attributes can't be read
    ///   (e.g. `fd` is not a terminal).
    /// - [`Error::TerminalConfigure`] if the raw attributes can't be applied.
    pub fn enable(fd: RawFd, timing: ReadTiming) -> Result<Self> {
        if RAW_MODE_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyActive);
        }

        let result = Self::enter(fd, timing);
        if result.is_err() {
            RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
        }
        result
    }

    fn enter(fd: RawFd, timing: ReadTiming) -> Result<Self> {
        let original = get_attrs(fd).map_err(Error::TerminalQuery)?;

        install_panic_hook();
        set_backup(Some((fd, original)));

        let raw = raw_attrs(&original, timing);
        if let Err(err) = set_attrs(fd, &raw) {
            set_backup(None);
            return Err(Error::TerminalConfigure(err));
        }

        tracing::debug!(
            fd,
            vmin = timing.min_bytes,
            vtime = timing.timeout_deciseconds,
            "entered raw mode"
        );

        Ok(Self {
            fd,
            original,
            restored: false,
        })
    }

    /// The attributes captured before raw mode was entered.
    #[inline]
    #[must_use]
    pub const fn original(&self) -> &libc::termios {
        &self.original
    }

    /// Leave raw mode, restoring the captured attributes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalConfigure`] if `tcsetattr` fails. The guard
    /// is spent either way; nothing is retried on drop.
    pub fn disable(mut self) -> Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        set_backup(None);
        RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);

        set_attrs(self.fd, &self.original).map_err(Error::TerminalConfigure)?;
        tracing::debug!(fd = self.fd, "left raw mode");
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(%err, "failed to restore terminal attributes");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
