//! Command-line flags
//!
//! Single-letter flags only, combinable (`-bd`). clap's own help and
//! version flags are disabled so `-h` and `-v` print the usage text and
//! version line below.
//!
//! Like getopt, flags are handled left to right and the first of `-h`,
//! `-v` or `-b` ends parsing: anything after it is never looked at.

use std::ffi::OsString;
use std::os::unix::ffi::{OsStrExt, OsStringExt};

use clap::Parser;

/// Flags that print something and exit
const QUERY_FLAGS: &[u8] = b"hvb";

#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(name = "mkb", disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Print help
    #[arg(short = 'h')]
    pub help: bool,

    /// Print version
    #[arg(short = 'v')]
    pub version: bool,

    /// Print bindings
    #[arg(short = 'b')]
    pub bindings: bool,

    /// Run as daemon
    #[arg(short = 'd')]
    pub daemonize: bool,
}

/// What the invocation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Help,
    Version,
    ListBindings,
    Run { daemonize: bool },
}

impl Cli {
    /// Parse a full argument list (including `argv[0]`)
    pub fn parse_args<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::try_parse_from(cut_after_first_query(args.into_iter().collect()))
    }

    /// At most one informational flag survives [`parse_args`](Self::parse_args);
    /// any of them wins over running.
    pub fn action(&self) -> Action {
        if self.help {
            Action::Help
        } else if self.version {
            Action::Version
        } else if self.bindings {
            Action::ListBindings
        } else {
            Action::Run {
                daemonize: self.daemonize,
            }
        }
    }
}

/// Drop everything after the first `h`, `v` or `b` flag character,
/// including the rest of its cluster (`-bv` becomes `-b`). Arguments
/// before it are kept so clap still rejects an earlier bad flag or
/// positional. A `--` ends the scan.
fn cut_after_first_query(mut args: Vec<OsString>) -> Vec<OsString> {
    for i in 1..args.len() {
        let bytes = args[i].as_bytes();
        if bytes == b"--" {
            break;
        }
        if bytes.len() < 2 || bytes[0] != b'-' || bytes[1] == b'-' {
            continue;
        }
        if let Some(pos) = bytes[1..].iter().position(|b| QUERY_FLAGS.contains(b)) {
            let cluster = bytes[..pos + 2].to_vec();
            args[i] = OsString::from_vec(cluster);
            args.truncate(i + 1);
            break;
        }
    }
    args
}

pub fn usage(argv0: &str) -> String {
    format!(
        "usage: {} [-h|-v|-b|-d]\n\
         \x20   -h    print help\n\
         \x20   -v    print version\n\
         \x20   -b    print bindings\n\
         \x20   -d    run as daemon\n",
        argv0
    )
}

pub fn version() -> String {
    format!("mkb {}", env!("CARGO_PKG_VERSION"))
}
