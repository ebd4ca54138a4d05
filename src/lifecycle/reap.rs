//! Child reaping disposition
//!
//! The launcher never waits on its children. Setting `SA_NOCLDWAIT` on
//! SIGCHLD tells the kernel to discard their exit status instead of
//! keeping them around as zombies.

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use tracing::debug;

use super::LifecycleError;

/// Make terminated children vanish without being waited for.
///
/// Must run before the first fork.
pub fn discard_child_status() -> Result<(), LifecycleError> {
    let action = SigAction::new(SigHandler::SigDfl, SaFlags::SA_NOCLDWAIT, SigSet::empty());

    // SAFETY: installs the default handler; no Rust code runs on delivery.
    unsafe { sigaction(Signal::SIGCHLD, &action) }.map_err(LifecycleError::Reaping)?;

    debug!("SIGCHLD set to SA_NOCLDWAIT");
    Ok(())
}
