//! Keypress reading and dispatch.
//!
//! The reader obtains exactly one byte from the terminal under the active
//! timing policy, retrying silently when a poll comes back empty. The
//! dispatcher maps that byte to an [`Action`] for the driver loop to act
//! on; components here never terminate the process themselves.

use std::io::{self, Read};

use tracing::trace;

/// The byte the terminal sends for Ctrl plus `byte`: bits 5 and 6 cleared.
pub const fn ctrl(byte: u8) -> u8 {
    byte & 0x1f
}

/// Ctrl-Q, the only bound key.
pub const QUIT_KEY: u8 = ctrl(b'q');

/// What the driver loop should do after a dispatched keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave raw mode, clear the screen, and exit successfully.
    Quit,
    /// No binding for this key yet; keep running.
    Ignore,
}

/// Block until a single byte arrives on `input`.
///
/// Empty reads (the `VTIME` expiry under raw mode) and the transient
/// `WouldBlock`/`Interrupted` conditions are retried without surfacing;
/// any other error is returned to the caller. If input is starved forever
/// this never returns, by design - termination comes from eventual input
/// or from the process being killed.
pub fn read_key(input: &mut impl Read) -> io::Result<u8> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(1) => return Ok(byte[0]),
            Ok(_) => continue,
            Err(err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::Interrupted =>
            {
                continue
            }
            Err(err) => return Err(err),
        }
    }
}

/// Read one keypress and map it to an [`Action`].
///
/// Only Ctrl-Q is bound. Every other byte is reserved for future dispatch
/// and reported as [`Action::Ignore`] with nothing written to the terminal.
pub fn process_keypress(input: &mut impl Read) -> io::Result<Action> {
    match read_key(input)? {
        QUIT_KEY => Ok(Action::Quit),
        byte => {
            trace!(byte, "keypress without a binding");
            Ok(Action::Ignore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// One poll outcome in a scripted input stream.
    enum Step {
        /// The timeout expired with no byte available.
        Timeout,
        Byte(u8),
        Fail(io::ErrorKind),
    }

    /// Replays a fixed script of poll outcomes; panics if read past the end.
    struct ScriptedInput {
        steps: VecDeque<Step>,
    }

    impl ScriptedInput {
        fn new(steps: impl IntoIterator<Item = Step>) -> Self {
            Self {
                steps: steps.into_iter().collect(),
            }
        }

        fn exhausted(&self) -> bool {
            self.steps.is_empty()
        }
    }

    impl Read for ScriptedInput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front().expect("read past the end of the script") {
                Step::Timeout => Ok(0),
                Step::Byte(byte) => {
                    buf[0] = byte;
                    Ok(1)
                }
                Step::Fail(kind) => Err(kind.into()),
            }
        }
    }

    #[test]
    fn test_ctrl_clears_bits_five_and_six() {
        assert_eq!(ctrl(b'q'), 0x11);
        assert_eq!(ctrl(b'c'), 0x03);
        assert_eq!(ctrl(b'h'), 0x08);
    }

    #[test]
    fn test_read_key_returns_the_byte() {
        let mut input = ScriptedInput::new([Step::Byte(b'x')]);
        assert_eq!(read_key(&mut input).unwrap(), b'x');
    }

    #[test]
    fn test_read_key_retries_through_empty_polls() {
        let mut input = ScriptedInput::new([
            Step::Timeout,
            Step::Timeout,
            Step::Timeout,
            Step::Byte(b'x'),
        ]);
        assert_eq!(read_key(&mut input).unwrap(), b'x');
        assert!(input.exhausted());
    }

    #[test]
    fn test_read_key_retries_transient_errors() {
        let mut input = ScriptedInput::new([
            Step::Fail(io::ErrorKind::WouldBlock),
            Step::Fail(io::ErrorKind::Interrupted),
            Step::Timeout,
            Step::Byte(b'q'),
        ]);
        assert_eq!(read_key(&mut input).unwrap(), b'q');
        assert!(input.exhausted());
    }

    #[test]
    fn test_read_key_propagates_real_errors() {
        let mut input = ScriptedInput::new([Step::Fail(io::ErrorKind::BrokenPipe)]);
        let err = read_key(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_quit_key_dispatches_quit() {
        let mut input = ScriptedInput::new([Step::Byte(QUIT_KEY)]);
        assert_eq!(process_keypress(&mut input).unwrap(), Action::Quit);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        // A plain 'q' must not quit, and Ctrl-C must not signal: signal
        // keys are plain bytes once ISIG is off.
        for byte in [b'q', b'Q', 0x00, 0x1b, ctrl(b'c'), 0x7f] {
            let mut input = ScriptedInput::new([Step::Byte(byte)]);
            assert_eq!(process_keypress(&mut input).unwrap(), Action::Ignore);
        }
    }

    #[test]
    fn test_dispatch_errors_reach_the_caller() {
        let mut input = ScriptedInput::new([Step::Fail(io::ErrorKind::UnexpectedEof)]);
        let err = process_keypress(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
