//! Signal handling for graceful shutdown

use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::debug;

use super::LifecycleError;

/// Handles shutdown signals (SIGTERM, SIGINT)
///
/// Handlers are registered on construction, so a signal arriving before
/// [`wait`](Self::wait) is first polled is not lost. Must be created
/// inside a tokio runtime.
pub struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
}

impl ShutdownSignal {
    /// Register the SIGTERM and SIGINT handlers
    pub fn new() -> Result<Self, LifecycleError> {
        let sigterm = signal(SignalKind::terminate()).map_err(LifecycleError::SignalHandler)?;
        let sigint = signal(SignalKind::interrupt()).map_err(LifecycleError::SignalHandler)?;
        Ok(Self { sigterm, sigint })
    }

    /// Wait for a shutdown signal
    pub async fn wait(&mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = self.sigint.recv() => {
                debug!("received SIGINT");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use nix::sys::signal::{raise, Signal as NixSignal};
    use tokio_test::{assert_pending, task};

    use super::*;

    #[tokio::test]
    async fn test_waits_until_sigterm() {
        let mut shutdown = ShutdownSignal::new().unwrap();

        {
            let mut wait = task::spawn(shutdown.wait());
            assert_pending!(wait.poll());
        }

        raise(NixSignal::SIGTERM).unwrap();
        tokio::time::timeout(Duration::from_secs(5), shutdown.wait())
            .await
            .expect("SIGTERM was not observed");
    }
}
