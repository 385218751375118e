// Front-end library - exposes the raw-mode lifecycle, keypress handling,
// and the escape protocol so they are testable without a terminal attached.

pub mod input;
pub mod screen;
pub mod terminal;
