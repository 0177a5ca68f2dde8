// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Test doubles: a scripted terminal and a real pseudo-terminal pair.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::input::ByteSource;

/// Scripted terminal: input is a byte queue, output is captured.
///
/// `None` entries in the input script are read timeouts. Once the script is
/// exhausted every read times out.
#[derive(Debug, Default)]
pub struct ScriptedTty {
    pub input: VecDeque<Option<u8>>,
    pub output: Vec<u8>,
    pub writes: usize,
}

impl ScriptedTty {
    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().map(Some).collect(),
            ..Self::default()
        }
    }

    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl ByteSource for ScriptedTty {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front().flatten())
    }
}

impl Write for ScriptedTty {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serializes tests that take the process-wide raw-mode guard.
static RAW_MODE_LOCK: Mutex<()> = Mutex::new(());

pub fn lock_raw_mode() -> MutexGuard<'static, ()> {
    RAW_MODE_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A pseudo-terminal pair. The slave side behaves like a real tty.
#[cfg(target_os = "linux")]
pub struct Pty {
    pub master: libc::c_int,
    pub slave: libc::c_int,
}

#[cfg(target_os = "linux")]
impl Pty {
    pub fn open() -> Self {
        unsafe {
            let master = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
            assert!(master >= 0, "posix_openpt failed");
            assert_eq!(libc::grantpt(master), 0);
            assert_eq!(libc::unlockpt(master), 0);

            let mut name = [0 as libc::c_char; 128];
            assert_eq!(libc::ptsname_r(master, name.as_mut_ptr(), name.len()), 0);
            let slave = libc::open(name.as_ptr(), libc::O_RDWR | libc::O_NOCTTY);
            assert!(slave >= 0, "opening pty slave failed");

            Self { master, slave }
        }
    }

    /// Set the window size the slave reports.
    pub fn set_size(&self, rows: u16, cols: u16) {
        let ws = libc::winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        assert_eq!(unsafe { libc::ioctl(self.master, libc::TIOCSWINSZ, &raw const ws) }, 0);
    }

    /// Type bytes into the slave's input.
    pub fn send(&self, bytes: &[u8]) {
        let n = unsafe { libc::write(self.master, bytes.as_ptr().cast(), bytes.len()) };
        assert_eq!(n, bytes.len() as isize);
    }

    /// Read exactly `len` bytes the slave wrote.
    pub fn receive(&self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = unsafe {
                libc::read(self.master, out[filled..].as_mut_ptr().cast(), len - filled)
            };
            assert!(n > 0, "pty master read failed");
            filled += n as usize;
        }
        out
    }
}

#[cfg(target_os = "linux")]
impl Drop for Pty {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.slave);
            libc::close(self.master);
        }
    }
}
