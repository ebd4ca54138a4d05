//! Configuration assembled from defaults, flags and the environment

use crate::bindings::Bindings;

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Key bindings to grab and dispatch
    pub bindings: Bindings,

    /// X display to connect to; `None` defers to `$DISPLAY`
    pub display: Option<String>,

    /// Detach from the controlling terminal before entering the loop
    pub daemonize: bool,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load(daemonize: bool) -> Self {
        let display = std::env::var("DISPLAY").ok().filter(|d| !d.is_empty());
        Self {
            bindings: Bindings::builtin(),
            display,
            daemonize,
        }
    }
}
