//! Raw-mode lifecycle for the controlling terminal.
//!
//! Acquiring a [`RawMode`] guard snapshots the terminal's line-discipline
//! settings and switches the device to byte-at-a-time input: no echo, no
//! line buffering, no signal keys, no output post-processing. The snapshot
//! is restored when the guard is dropped, so every path out of the process
//! (including unwinding) leaves the terminal the way it was found.

use std::os::fd::AsFd;

use anyhow::{Context, Result};
use nix::sys::termios::{
    self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices,
    Termios,
};
use tracing::warn;

/// The `VMIN`/`VTIME` pair applied while raw mode is active.
///
/// With `min_bytes = 0` and a one-decisecond timeout, every read on the
/// terminal returns after at most 100ms whether or not a byte arrived,
/// which is what lets the input loop poll without blocking indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    /// Minimum number of bytes before a read may return (`VMIN`).
    pub min_bytes: u8,
    /// Maximum wait before a read returns empty, in deciseconds (`VTIME`).
    pub timeout_deciseconds: u8,
}

/// The fixed timing policy: return immediately on input, give up after 100ms.
pub const POLL_TIMING: PollTiming = PollTiming {
    min_bytes: 0,
    timeout_deciseconds: 1,
};

/// Guard owning the terminal attributes captured before raw mode was applied.
///
/// Enabling twice on the same device nests: the inner guard's "original"
/// snapshot is the already-raw state, so guards must be released in reverse
/// order of acquisition.
pub struct RawMode<Fd: AsFd> {
    fd: Fd,
    original: Termios,
    armed: bool,
}

impl<Fd: AsFd> RawMode<Fd> {
    /// Switch the terminal behind `fd` into raw mode.
    ///
    /// The current attributes are captured first; they are the sole source
    /// of truth for restoration and are never modified after this point.
    pub fn enable(fd: Fd) -> Result<Self> {
        let original = termios::tcgetattr(&fd)
            .context("failed to query terminal attributes (tcgetattr)")?;
        apply(&fd, &raw_config(&original))
            .context("failed to apply raw terminal attributes (tcsetattr)")?;
        Ok(RawMode {
            fd,
            original,
            armed: true,
        })
    }

    /// Restore the attributes captured by [`RawMode::enable`].
    ///
    /// Prefer this to dropping the guard on deliberate shutdown: a failed
    /// restoration surfaces as an error here, while the drop hook can only
    /// log it.
    pub fn disable(mut self) -> Result<()> {
        self.armed = false;
        apply(&self.fd, &self.original)
            .context("failed to restore terminal attributes (tcsetattr)")
    }
}

impl<Fd: AsFd> Drop for RawMode<Fd> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = apply(&self.fd, &self.original) {
            warn!("failed to restore terminal attributes: {err}");
        }
    }
}

/// Apply `config` with `TCSAFLUSH`: pending output is drained and unread
/// input is discarded before the change takes effect.
fn apply(fd: &impl AsFd, config: &Termios) -> nix::Result<()> {
    termios::tcsetattr(fd, SetArg::TCSAFLUSH, config)
}

/// Derive the raw configuration from a snapshot of the original attributes.
///
/// Input: no break signaling, no CR-to-NL translation, no parity checking,
/// no 8th-bit stripping, no XON/XOFF flow control. Output: no
/// post-processing. Local: no echo, no canonical buffering, no extended
/// input processing, no signal keys. Control: 8-bit characters. The control
/// characters take their timing from [`POLL_TIMING`].
fn raw_config(original: &Termios) -> Termios {
    let mut raw = original.clone();
    raw.input_flags &= !(InputFlags::BRKINT
        | InputFlags::ICRNL
        | InputFlags::INPCK
        | InputFlags::ISTRIP
        | InputFlags::IXON);
    raw.output_flags &= !OutputFlags::OPOST;
    raw.control_flags |= ControlFlags::CS8;
    raw.local_flags &=
        !(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG);
    raw.control_chars[SpecialCharacterIndices::VMIN as usize] = POLL_TIMING.min_bytes;
    raw.control_chars[SpecialCharacterIndices::VTIME as usize] = POLL_TIMING.timeout_deciseconds;
    raw
}
