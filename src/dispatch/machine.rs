//! Key event dispatcher
//!
//! Resolves each key event to its base keysym, prints the diagnostic line,
//! and on a press hands the bound command (if any) to the launcher.

use std::io::Write;

use tracing::{debug, warn};

use crate::bindings::Bindings;
use crate::events::{InputEvent, KeyEvent, KeyEventKind, KeyReport};
use crate::hotkey::WindowSystem;
use crate::launcher::Launch;

/// The two states of the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Blocked on the next event
    #[default]
    Waiting,
    /// Handling one event
    Dispatching,
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopState::Waiting => write!(f, "Waiting"),
            LoopState::Dispatching => write!(f, "Dispatching"),
        }
    }
}

/// Routes key events from the display to the launcher
pub struct Dispatcher<'a, L, O> {
    bindings: &'a Bindings,
    launcher: L,
    /// Sink for the per-event diagnostic lines (stdout in the daemon)
    out: O,
    state: LoopState,
    launches: u64,
}

impl<'a, L: Launch, O: Write> Dispatcher<'a, L, O> {
    pub fn new(bindings: &'a Bindings, launcher: L, out: O) -> Self {
        Self {
            bindings,
            launcher,
            out,
            state: LoopState::Waiting,
            launches: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of launches requested so far
    pub fn launches(&self) -> u64 {
        self.launches
    }

    #[cfg(test)]
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Handle every event already queued on `display`, in delivery order.
    ///
    /// Returns the number of events handled. An error from the display
    /// ends the pump; errors while handling an event never do.
    pub fn pump<W: WindowSystem>(&mut self, display: &W) -> Result<usize, W::Error> {
        let mut handled = 0;
        while let Some(event) = display.poll_event()? {
            self.state = LoopState::Dispatching;
            if let InputEvent::Key(key) = event {
                self.dispatch(display, key);
            }
            self.state = LoopState::Waiting;
            handled += 1;
        }
        Ok(handled)
    }

    /// Handle a single key event
    pub fn dispatch<W: WindowSystem>(&mut self, display: &W, event: KeyEvent) {
        let keysym = display.keysym_for(event.keycode);
        let report = KeyReport { event, keysym };

        if let Err(e) = writeln!(self.out, "{}", report).and_then(|_| self.out.flush()) {
            warn!(?e, "failed to write event line");
        }

        if event.kind != KeyEventKind::Press {
            return;
        }

        let command = self.bindings.lookup(keysym);
        if let Some(command) = command {
            debug!(keycode = event.keycode, %command, "dispatching");
            self.launches += 1;
        }
        self.launcher.launch(command);
    }
}
