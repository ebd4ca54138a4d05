//! Detaching from the controlling terminal (`-d`)

use nix::unistd::daemon;

use super::LifecycleError;

/// Fork into the background and start a new session.
///
/// Keeps the working directory and redirects stdio to `/dev/null`. The
/// calling process exits inside this function; the daemon continues in
/// the child, which inherits the X connection and signal dispositions.
/// Must be called before any tokio runtime exists.
pub fn detach() -> Result<(), LifecycleError> {
    daemon(true, false).map_err(LifecycleError::Daemonize)
}
