//! [`WindowSystem`] implementation backed by an X11 connection.
//!
//! Talks to the X server named by `$DISPLAY` through `x11rb`. The keyboard
//! mapping is fetched once at connect time; bindings are fixed, so a later
//! layout change only affects which keys were grabbed at startup.

use std::os::unix::io::{AsFd, BorrowedFd};

use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError};
use x11rb::protocol::xproto::{ConnectionExt as _, GrabMode, ModMask, Window};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use xkeysym::Keysym;

use crate::events::{InputEvent, KeyEvent, Keycode};
use crate::hotkey::display::WindowSystem;
use crate::hotkey::Keymap;

/// `AnyKey` wildcard for `UngrabKey`
const ANY_KEY: Keycode = 0;

/// Errors that can occur when talking to the X server
#[derive(Debug, thiserror::Error)]
pub enum X11Error {
    #[error("can't open display")]
    Connect(#[from] ConnectError),

    #[error("X connection error")]
    Connection(#[from] ConnectionError),

    #[error("X request failed")]
    Reply(#[from] ReplyError),
}

/// Connection to the X server plus the state needed for grabbing keys
pub struct X11Display {
    conn: RustConnection,
    root: Window,
    keymap: Keymap,
}

impl X11Display {
    /// Connect to `display_name` (or `$DISPLAY` when `None`) and read its
    /// keyboard mapping
    pub fn connect(display_name: Option<&str>) -> Result<Self, X11Error> {
        let (conn, screen_num) = x11rb::connect(display_name)?;
        let root = conn.setup().roots[screen_num].root;

        let min = conn.setup().min_keycode;
        let max = conn.setup().max_keycode;
        let count = max.saturating_sub(min).saturating_add(1);
        let mapping = conn.get_keyboard_mapping(min, count)?.reply()?;
        let keymap = Keymap::from_raw(min, mapping.keysyms_per_keycode, &mapping.keysyms);

        info!(screen = screen_num, root, min, max, "connected to X display");

        Ok(Self { conn, root, keymap })
    }
}

impl WindowSystem for X11Display {
    type Error = X11Error;

    fn keycode_for(&self, keysym: Keysym) -> Option<Keycode> {
        self.keymap.keycode_for(keysym)
    }

    fn keysym_for(&self, keycode: Keycode) -> Keysym {
        self.keymap.keysym_for(keycode)
    }

    fn grab_key(&self, keycode: Keycode) -> Result<bool, X11Error> {
        let cookie = self.conn.grab_key(
            false,
            self.root,
            ModMask::ANY,
            keycode,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
        )?;

        match cookie.check() {
            Ok(()) => Ok(true),
            Err(ReplyError::X11Error(e)) => {
                debug!(keycode, error = ?e.error_kind, "GrabKey rejected");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn ungrab_all(&self) -> Result<(), X11Error> {
        self.conn.ungrab_key(ANY_KEY, self.root, ModMask::ANY)?;
        self.conn.flush()?;
        Ok(())
    }

    fn poll_event(&self) -> Result<Option<InputEvent>, X11Error> {
        let event = match self.conn.poll_for_event()? {
            Some(Event::KeyPress(ev)) => InputEvent::Key(KeyEvent::press(ev.detail)),
            Some(Event::KeyRelease(ev)) => InputEvent::Key(KeyEvent::release(ev.detail)),
            Some(_) => InputEvent::Other,
            None => return Ok(None),
        };
        Ok(Some(event))
    }
}

impl AsFd for X11Display {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.conn.stream().as_fd()
    }
}
