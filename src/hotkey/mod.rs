//! Hotkey module for global keyboard grabs
//!
//! Translates bound key symbols to X keycodes and registers root-window
//! grabs for them, so presses reach the daemon regardless of focus.

mod display;
mod grab;
mod keys;
mod x11;

pub use display::WindowSystem;
pub use grab::KeyGrabber;
pub use keys::{keysym_name, Keymap};
pub use x11::X11Display;

#[cfg(test)]
pub use display::mock;
