//! Abstraction over the windowing system
//!
//! The grab manager and the dispatcher only talk to the display through
//! [`WindowSystem`], so the X11 backend can be swapped for an in-memory
//! double in tests.

use xkeysym::Keysym;

use crate::events::{InputEvent, Keycode};

/// The external service that owns the keyboard: keycode translation,
/// global key grabs and the input event queue.
pub trait WindowSystem {
    /// The error type produced by this backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Physical key producing `keysym` on the current layout, if any.
    fn keycode_for(&self, keysym: Keysym) -> Option<Keycode>;

    /// Base keysym of `keycode`, ignoring modifiers. `NoSymbol` if unmapped.
    fn keysym_for(&self, keycode: Keycode) -> Keysym;

    /// Grab `keycode` on the root window under any modifier combination.
    ///
    /// Returns `Ok(false)` when the server refused the grab (for example
    /// because another client already holds it). `Err` means the
    /// connection itself failed.
    fn grab_key(&self, keycode: Keycode) -> Result<bool, Self::Error>;

    /// Release every key grab held on the root window.
    fn ungrab_all(&self) -> Result<(), Self::Error>;

    /// Next queued event without blocking, or `None` if the queue is empty.
    fn poll_event(&self) -> Result<Option<InputEvent>, Self::Error>;
}

#[cfg(test)]
pub mod mock {
    //! In-memory [`WindowSystem`] that records grabs and replays queued events.

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::hotkey::Keymap;

    #[derive(Debug, thiserror::Error)]
    #[error("mock display error")]
    pub struct MockError;

    #[derive(Debug)]
    pub struct MockDisplay {
        pub keymap: Keymap,
        pub events: RefCell<VecDeque<InputEvent>>,
        pub grabbed: RefCell<Vec<Keycode>>,
        pub refused: Vec<Keycode>,
        pub ungrab_calls: RefCell<usize>,
        pub broken: bool,
    }

    impl MockDisplay {
        pub fn new(keymap: Keymap) -> Self {
            Self {
                keymap,
                events: RefCell::new(VecDeque::new()),
                grabbed: RefCell::new(Vec::new()),
                refused: Vec::new(),
                ungrab_calls: RefCell::new(0),
                broken: false,
            }
        }

        pub fn push(&self, event: InputEvent) {
            self.events.borrow_mut().push_back(event);
        }
    }

    impl WindowSystem for MockDisplay {
        type Error = MockError;

        fn keycode_for(&self, keysym: Keysym) -> Option<Keycode> {
            self.keymap.keycode_for(keysym)
        }

        fn keysym_for(&self, keycode: Keycode) -> Keysym {
            self.keymap.keysym_for(keycode)
        }

        fn grab_key(&self, keycode: Keycode) -> Result<bool, MockError> {
            if self.broken {
                return Err(MockError);
            }
            if self.refused.contains(&keycode) {
                return Ok(false);
            }
            self.grabbed.borrow_mut().push(keycode);
            Ok(true)
        }

        fn ungrab_all(&self) -> Result<(), MockError> {
            *self.ungrab_calls.borrow_mut() += 1;
            self.grabbed.borrow_mut().clear();
            Ok(())
        }

        fn poll_event(&self) -> Result<Option<InputEvent>, MockError> {
            if self.broken {
                return Err(MockError);
            }
            Ok(self.events.borrow_mut().pop_front())
        }
    }
}
