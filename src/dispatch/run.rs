//! Event loop driver
//!
//! Waits for the display socket to become readable, then drains every
//! queued event through the [`Dispatcher`]. Runs on a current-thread
//! runtime, so dispatch never overlaps and the process stays
//! single-threaded for `fork`.

use std::future::Future;
use std::io::Write;
use std::os::unix::io::AsFd;

use anyhow::{Context, Result};
use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tracing::{debug, info};

use crate::hotkey::WindowSystem;
use crate::launcher::Launch;

use super::machine::Dispatcher;

/// Run the event loop until `shutdown` completes or the display fails
pub async fn run<W, L, O, F>(
    display: &W,
    dispatcher: &mut Dispatcher<'_, L, O>,
    shutdown: F,
) -> Result<()>
where
    W: WindowSystem + AsFd,
    L: Launch,
    O: Write,
    F: Future<Output = ()>,
{
    let socket = AsyncFd::with_interest(display.as_fd(), Interest::READABLE)
        .context("failed to register display socket")?;
    tokio::pin!(shutdown);

    info!("entering event loop");

    loop {
        // Events may already sit in the client-side queue (read while
        // waiting for a reply), so drain before waiting on the socket.
        let handled = dispatcher
            .pump(display)
            .context("lost connection to the display")?;
        if handled > 0 {
            debug!(handled, state = %dispatcher.state(), "event queue drained");
        }

        tokio::select! {
            ready = socket.readable() => {
                let mut guard = ready.context("failed to poll display socket")?;
                guard.clear_ready();
            }
            _ = &mut shutdown => {
                info!(launches = dispatcher.launches(), "event loop stopped");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::os::unix::io::BorrowedFd;
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    use xkeysym::Keysym;

    use super::*;
    use crate::bindings::{Binding, Bindings, Command};
    use crate::events::{InputEvent, KeyEvent};
    use crate::hotkey::mock::MockDisplay;
    use crate::hotkey::Keymap;

    /// Mock display whose "socket" is one end of a socket pair
    struct SocketDisplay {
        inner: MockDisplay,
        socket: UnixStream,
    }

    impl WindowSystem for SocketDisplay {
        type Error = <MockDisplay as WindowSystem>::Error;

        fn keycode_for(&self, keysym: Keysym) -> Option<u8> {
            self.inner.keycode_for(keysym)
        }

        fn keysym_for(&self, keycode: u8) -> Keysym {
            self.inner.keysym_for(keycode)
        }

        fn grab_key(&self, keycode: u8) -> Result<bool, Self::Error> {
            self.inner.grab_key(keycode)
        }

        fn ungrab_all(&self) -> Result<(), Self::Error> {
            self.inner.ungrab_all()
        }

        fn poll_event(&self) -> Result<Option<InputEvent>, Self::Error> {
            self.inner.poll_event()
        }
    }

    impl AsFd for SocketDisplay {
        fn as_fd(&self) -> BorrowedFd<'_> {
            self.socket.as_fd()
        }
    }

    #[derive(Default)]
    struct CountingLauncher(usize);

    impl Launch for CountingLauncher {
        fn launch(&mut self, command: Option<&Command>) {
            if command.is_some() {
                self.0 += 1;
            }
        }
    }

    fn socket_display() -> (SocketDisplay, UnixStream) {
        let (ours, theirs) = UnixStream::pair().unwrap();
        ours.set_nonblocking(true).unwrap();
        let inner = MockDisplay::new(Keymap::new(8, 1, vec![Keysym::XF86_AudioPlay]));
        (SocketDisplay { inner, socket: ours }, theirs)
    }

    #[tokio::test]
    async fn test_queued_events_dispatched_before_shutdown() {
        let bindings = Bindings::new(vec![Binding::new(Keysym::XF86_AudioPlay, "mpc", &["-q", "toggle"])]);
        let (display, _peer) = socket_display();
        display.inner.push(InputEvent::Key(KeyEvent::press(8)));
        display.inner.push(InputEvent::Key(KeyEvent::release(8)));
        display.inner.push(InputEvent::Key(KeyEvent::press(8)));

        let mut dispatcher = Dispatcher::new(&bindings, CountingLauncher::default(), std::io::sink());
        run(&display, &mut dispatcher, tokio::time::sleep(Duration::from_millis(50)))
            .await
            .unwrap();

        assert_eq!(dispatcher.launcher().0, 2);
    }

    #[tokio::test]
    async fn test_wakes_on_socket_readiness() {
        use std::io::Write as _;

        let bindings = Bindings::new(vec![Binding::new(Keysym::XF86_AudioPlay, "mpc", &["-q", "toggle"])]);
        let (display, mut peer) = socket_display();
        let mut dispatcher = Dispatcher::new(&bindings, CountingLauncher::default(), std::io::sink());

        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            display.inner.push(InputEvent::Key(KeyEvent::press(8)));
            peer.write_all(&[0]).unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        };
        run(&display, &mut dispatcher, shutdown).await.unwrap();

        assert_eq!(dispatcher.launches(), 1);
    }

    #[tokio::test]
    async fn test_display_failure_is_error() {
        let bindings = Bindings::default();
        let (mut display, _peer) = socket_display();
        display.inner.broken = true;
        let mut dispatcher = Dispatcher::new(&bindings, CountingLauncher::default(), std::io::sink());

        let result = run(&display, &mut dispatcher, std::future::pending()).await;
        assert!(result.is_err());
    }
}
