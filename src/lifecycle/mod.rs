//! Process lifecycle: child reaping, daemonization and shutdown signals

mod detach;
mod reap;
mod shutdown;

use nix::errno::Errno;

pub use detach::detach;
pub use reap::discard_child_status;
pub use shutdown::ShutdownSignal;

/// Errors raised while setting up the process environment
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("sigaction(SIGCHLD): {0}")]
    Reaping(#[source] Errno),

    #[error("daemon: {0}")]
    Daemonize(#[source] Errno),

    #[error("failed to register signal handler: {0}")]
    SignalHandler(#[source] std::io::Error),
}
