//! mkb: minimal X11 hotkey daemon
//!
//! Grabs a fixed set of media keys on the root window and, whenever one is
//! pressed, launches the command bound to it:
//! - Global key grabs via x11rb, independent of focus and modifiers
//! - Fully detached launches (double fork, no zombies, no waiting)
//! - One diagnostic line per key event on stdout
//!
//! The loop is single-threaded; a current-thread tokio runtime only
//! multiplexes the X socket with SIGTERM/SIGINT for a clean ungrab.

mod bindings;
mod cli;
mod config;
mod dispatch;
mod events;
mod hotkey;
mod launcher;
mod lifecycle;

use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Action, Cli};
use crate::config::{Config, DEFAULT_LOG_FILTER};
use crate::dispatch::Dispatcher;
use crate::hotkey::{KeyGrabber, X11Display};
use crate::launcher::DetachedLauncher;
use crate::lifecycle::ShutdownSignal;

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<OsString> = std::env::args_os().collect();
    let argv0 = args
        .first()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mkb".to_string());

    let cli = match Cli::parse_args(args) {
        Ok(cli) => cli,
        Err(_) => {
            eprint!("{}", cli::usage(&argv0));
            return ExitCode::FAILURE;
        }
    };

    let daemonize = match cli.action() {
        Action::Help => {
            print!("{}", cli::usage(&argv0));
            return ExitCode::SUCCESS;
        }
        Action::Version => {
            println!("{}", cli::version());
            return ExitCode::SUCCESS;
        }
        Action::ListBindings => {
            for binding in &Config::load(false).bindings {
                println!("{}", binding);
            }
            return ExitCode::SUCCESS;
        }
        Action::Run { daemonize } => daemonize,
    };

    info!(version = env!("CARGO_PKG_VERSION"), "mkb starting");

    match run_daemon(Config::load(daemonize)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Set up the process, grab keys and run the event loop until a shutdown
/// signal arrives.
fn run_daemon(config: Config) -> Result<()> {
    // Children must be auto-reaped before the first launch can happen
    lifecycle::discard_child_status().context("can't set up child reaping")?;

    let display = X11Display::connect(config.display.as_deref())?;

    let mut grabber = KeyGrabber::new(&display);
    grabber.grab_all(&config.bindings)?;

    // daemon(3) forks, so this must precede the runtime and its signal pipes
    if config.daemonize {
        if let Err(e) = lifecycle::detach() {
            warn!(error = %e, "failed to daemonize, staying attached");
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    let result = runtime.block_on(async {
        let mut shutdown = ShutdownSignal::new()?;
        let mut dispatcher =
            Dispatcher::new(&config.bindings, DetachedLauncher::new(), std::io::stdout());

        info!("daemon initialized, entering main loop");
        dispatch::run(&display, &mut dispatcher, shutdown.wait()).await
    });

    // Cleanup
    info!(grabbed = grabber.grabbed().len(), "shutting down...");
    grabber.ungrab_all();
    info!("mkb stopped");

    result
}
