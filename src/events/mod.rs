//! Input events delivered by the window system
//!
//! Only key press/release events matter to the daemon; everything else
//! the server sends is collapsed into [`InputEvent::Other`].

use std::fmt;

use xkeysym::Keysym;

use crate::hotkey::keysym_name;

/// Native, layout-specific key code as used by the X server
pub type Keycode = u8;

/// Whether a key went down or up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Release,
}

impl fmt::Display for KeyEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEventKind::Press => write!(f, "press"),
            KeyEventKind::Release => write!(f, "release"),
        }
    }
}

/// A key press or release on a grabbed key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub keycode: Keycode,
}

impl KeyEvent {
    pub fn press(keycode: Keycode) -> Self {
        Self {
            kind: KeyEventKind::Press,
            keycode,
        }
    }

    pub fn release(keycode: Keycode) -> Self {
        Self {
            kind: KeyEventKind::Release,
            keycode,
        }
    }
}

/// Anything pulled off the window system's event queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Any non-keyboard event; ignored by the dispatcher
    Other,
}

/// A key event resolved to its base keysym, ready for the diagnostic line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyReport {
    pub event: KeyEvent,
    pub keysym: Keysym,
}

/// Formats as `<press|release> <code> (<name>)`
impl fmt::Display for KeyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.event.kind,
            self.event.keycode,
            keysym_name(self.keysym)
        )
    }
}
