//! The fixed ANSI escape protocol.
//!
//! Two sequences are the entire output surface: erase the visible display,
//! then home the cursor. They run on every path out of the program - quit,
//! startup error, runtime error - so the screen is always left clean.

use std::io::{self, Write};

/// Erase the entire visible display (`ESC [ 2 J`).
pub const ERASE_DISPLAY: &[u8] = b"\x1b[2J";

/// Move the cursor to row 1, column 1 (`ESC [ H`).
pub const CURSOR_HOME: &[u8] = b"\x1b[H";

/// Erase the display and home the cursor, in that order.
pub fn clear(out: &mut impl Write) -> io::Result<()> {
    out.write_all(ERASE_DISPLAY)?;
    out.write_all(CURSOR_HOME)?;
    out.flush()
}
