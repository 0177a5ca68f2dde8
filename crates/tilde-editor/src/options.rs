//! Editor options.
//!
//! Everything has a compiled-in default. The environment can override the
//! escape timeout, which is the only knob worth turning at this stage:
//!
//! | Variable            | Type           | Default | Effect                       |
//! |---------------------|----------------|---------|------------------------------|
//! | `TILDE_ESC_TIMEOUT` | integer 1–255  | 1       | read timeout in deciseconds  |
//!
//! A longer timeout helps over slow links where an escape sequence can
//! arrive split across reads; a shorter one isn't possible (`VTIME` has a
//! resolution of 100ms).

use tilde_term::input::Key;
use tilde_term::terminal::ReadTiming;

/// Environment variable overriding the raw-mode read timeout.
pub const ESC_TIMEOUT_VAR: &str = "TILDE_ESC_TIMEOUT";

/// Runtime configuration for the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Welcome text drawn a third of the way down the screen.
    pub banner: String,
    /// Raw-mode read timing.
    pub timing: ReadTiming,
    /// Key that exits the editor.
    pub quit_key: Key,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            banner: format!("Tilde editor -- version {}", env!("CARGO_PKG_VERSION")),
            timing: ReadTiming::default(),
            quit_key: Key::ctrl(b'q'),
        }
    }
}

impl Options {
    /// Defaults, with overrides read from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults, with overrides read through `lookup`.
    ///
    /// Invalid values are logged and ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(raw) = lookup(ESC_TIMEOUT_VAR) {
            match parse_timeout(&raw) {
                Some(deciseconds) => options.timing.timeout_deciseconds = deciseconds,
                None => tracing::warn!(
                    value = %raw,
                    "ignoring {ESC_TIMEOUT_VAR}: expected deciseconds in 1..=255"
                ),
            }
        }

        options
    }
}

/// Parse a read timeout in deciseconds. Zero is rejected: with `VMIN = 0`
/// it would turn every read into a busy poll.
#[must_use]
pub fn parse_timeout(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok().filter(|&d| d > 0)
}
