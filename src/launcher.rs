//! Detached command launcher
//!
//! Commands are started with a double fork: the intermediate child starts a
//! new session, forks the grandchild that execs the command, and exits at
//! once. The grandchild is reparented to init, and the intermediate child
//! is discarded by the `SA_NOCLDWAIT` disposition installed at startup, so
//! the daemon never waits on anything and never accumulates zombies.

use std::ffi::{CString, NulError};
use std::iter;
use std::ptr;

use libc::c_char;
use nix::errno::Errno;
use nix::unistd::{fork, setsid, ForkResult, Pid};
use tracing::{debug, warn};

use crate::bindings::Command;

/// Exit status of a grandchild whose exec failed
const EXEC_FAILED: i32 = 127;

/// Something that can start a bound command
pub trait Launch {
    /// Start `command` without waiting for it. `None` is a no-op.
    fn launch(&mut self, command: Option<&Command>);
}

/// Errors that can occur before the command is handed to the OS
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("argument contains a NUL byte: {0}")]
    InvalidArgument(#[from] NulError),

    #[error("fork: {0}")]
    Fork(#[source] Errno),
}

/// Launches commands as orphaned, session-leading processes
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl DetachedLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Fork the intermediate child and return its pid.
    ///
    /// Everything the children need, including the NULL-terminated
    /// `argv` pointer array, is built here before forking. The children
    /// never allocate.
    pub fn spawn(&self, command: &Command) -> Result<Pid, LaunchError> {
        let args = command
            .argv()
            .map(CString::new)
            .collect::<Result<Vec<_>, _>>()?;
        let argv: Vec<*const c_char> = args
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(iter::once(ptr::null()))
            .collect();
        let exec_prefix = format!("exec {}: ", command.program()).into_bytes();

        // SAFETY: the child only calls setsid, fork, execvp, write and _exit,
        // all async-signal-safe, on memory prepared above.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => Ok(child),
            Ok(ForkResult::Child) => detach_and_exec(&argv, &exec_prefix),
            Err(errno) => Err(LaunchError::Fork(errno)),
        }
    }
}

impl Launch for DetachedLauncher {
    fn launch(&mut self, command: Option<&Command>) {
        let Some(command) = command else {
            return;
        };

        match self.spawn(command) {
            Ok(pid) => debug!(%command, %pid, "command launched"),
            Err(e) => warn!(%command, error = %e, "failed to launch command"),
        }
    }
}

/// Body of the intermediate child. Never returns.
///
/// `argv` is a NULL-terminated array of pointers into `CString`s owned by
/// the caller.
fn detach_and_exec(argv: &[*const c_char], exec_prefix: &[u8]) -> ! {
    let _ = setsid();

    // SAFETY: same restrictions as the first fork.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            let program = argv[0];
            if !program.is_null() {
                // SAFETY: program and argv point into live, NUL-terminated
                // strings and argv ends with a null pointer. execvp only
                // returns on failure.
                unsafe { libc::execvp(program, argv.as_ptr()) };
                report(exec_prefix, Errno::last());
            }
            exit_now(EXEC_FAILED)
        }
        Ok(ForkResult::Parent { .. }) => exit_now(0),
        Err(errno) => {
            report(b"fork: ", errno);
            exit_now(0)
        }
    }
}

/// Write `<prefix><strerror>\n` straight to fd 2 without allocating
fn report(prefix: &[u8], errno: Errno) {
    for chunk in [prefix, errno.desc().as_bytes(), b"\n".as_slice()] {
        // SAFETY: writing a valid buffer to a file descriptor.
        unsafe {
            libc::write(libc::STDERR_FILENO, chunk.as_ptr().cast(), chunk.len());
        }
    }
}

fn exit_now(code: i32) -> ! {
    // SAFETY: _exit skips atexit handlers and stdio flushing, which must
    // not run in a forked copy of the daemon.
    unsafe { libc::_exit(code) }
}
