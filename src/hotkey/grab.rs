//! Global key grab management
//!
//! Registers a root-window grab for every bound key symbol that exists on
//! the current keyboard layout and releases them all on shutdown.

use tracing::{debug, info, warn};

use crate::bindings::Bindings;
use crate::events::Keycode;
use crate::hotkey::keysym_name;

use super::display::WindowSystem;

/// Owns the set of keycodes currently grabbed on the display
pub struct KeyGrabber<'a, W: WindowSystem> {
    display: &'a W,
    grabbed: Vec<Keycode>,
}

/// Errors that abort grabbing altogether
#[derive(Debug, thiserror::Error)]
pub enum GrabError {
    #[error("lost connection to the display while grabbing keys")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl<'a, W: WindowSystem> KeyGrabber<'a, W> {
    pub fn new(display: &'a W) -> Self {
        Self {
            display,
            grabbed: Vec::new(),
        }
    }

    /// Grab every binding's key.
    ///
    /// Symbols with no keycode on this layout, and grabs the server
    /// refuses, are warned about and skipped. Only a connection failure
    /// is an error.
    pub fn grab_all(&mut self, bindings: &Bindings) -> Result<usize, GrabError> {
        for binding in bindings {
            let name = keysym_name(binding.keysym);

            let Some(keycode) = self.display.keycode_for(binding.keysym) else {
                warn!(
                    keysym = %name,
                    raw = binding.keysym.raw(),
                    "can't find keycode for keysym"
                );
                continue;
            };

            match self.display.grab_key(keycode) {
                Ok(true) => {
                    debug!(keysym = %name, keycode, "key grabbed");
                    if !self.grabbed.contains(&keycode) {
                        self.grabbed.push(keycode);
                    }
                }
                Ok(false) => {
                    warn!(keysym = %name, keycode, "key grab refused, already grabbed by another client?");
                }
                Err(e) => return Err(GrabError::Connection(Box::new(e))),
            }
        }

        info!(grabbed = self.grabbed.len(), bound = bindings.len(), "keys grabbed");
        Ok(self.grabbed.len())
    }

    /// Release all grabs on the root window. Safe to call repeatedly or
    /// when nothing was grabbed.
    pub fn ungrab_all(&mut self) {
        if let Err(e) = self.display.ungrab_all() {
            warn!(?e, "failed to release key grabs");
        }
        self.grabbed.clear();
    }

    /// Keycodes currently grabbed
    pub fn grabbed(&self) -> &[Keycode] {
        &self.grabbed
    }
}

#[cfg(test)]
mod tests {
    use xkeysym::Keysym;

    use super::*;
    use crate::bindings::Binding;
    use crate::hotkey::display::mock::MockDisplay;
    use crate::hotkey::Keymap;

    fn two_bindings() -> Bindings {
        Bindings::new(vec![
            Binding::new(Keysym::XF86_AudioPlay, "mpc", &["-q", "toggle"]),
            Binding::new(Keysym::XF86_AudioStop, "mpc", &["-q", "stop"]),
        ])
    }

    fn display_with_play_only() -> MockDisplay {
        MockDisplay::new(Keymap::new(8, 1, vec![Keysym::a, Keysym::XF86_AudioPlay]))
    }

    #[test]
    fn test_partial_translation_is_not_fatal() {
        let display = display_with_play_only();
        let mut grabber = KeyGrabber::new(&display);

        let count = grabber.grab_all(&two_bindings()).unwrap();

        assert_eq!(count, 1);
        assert_eq!(grabber.grabbed(), &[9]);
        assert_eq!(*display.grabbed.borrow(), vec![9]);
    }

    #[test]
    fn test_refused_grab_is_skipped() {
        let mut display = MockDisplay::new(Keymap::new(
            8,
            1,
            vec![Keysym::XF86_AudioPlay, Keysym::XF86_AudioStop],
        ));
        display.refused = vec![8];
        let mut grabber = KeyGrabber::new(&display);

        assert_eq!(grabber.grab_all(&two_bindings()).unwrap(), 1);
        assert_eq!(grabber.grabbed(), &[9]);
    }

    #[test]
    fn test_connection_failure_is_error() {
        let mut display = display_with_play_only();
        display.broken = true;
        let mut grabber = KeyGrabber::new(&display);

        assert!(matches!(
            grabber.grab_all(&two_bindings()),
            Err(GrabError::Connection(_))
        ));
    }

    #[test]
    fn test_ungrab_all_is_idempotent() {
        let display = display_with_play_only();
        let mut grabber = KeyGrabber::new(&display);

        grabber.ungrab_all();
        grabber.grab_all(&two_bindings()).unwrap();
        grabber.ungrab_all();
        grabber.ungrab_all();

        assert!(grabber.grabbed().is_empty());
        assert!(display.grabbed.borrow().is_empty());
        assert_eq!(*display.ungrab_calls.borrow(), 3);
    }
}
