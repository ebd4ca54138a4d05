//! Key binding table
//!
//! Maps logical key symbols to the command launched when that key is
//! pressed. The table is built once at startup and only read afterwards.

use std::fmt;

use xkeysym::Keysym;

use crate::hotkey::keysym_name;

/// A command to run: the program (looked up in `PATH`) and its arguments.
///
/// The program name is a separate field, so a command can never be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    program: String,
    args: Vec<String>,
}

impl Command {
    /// Create a command from a program name and its arguments
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The executable name or path
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector, starting with the program name
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A single key symbol -> command pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub keysym: Keysym,
    pub command: Command,
}

impl Binding {
    pub fn new(keysym: Keysym, program: &str, args: &[&str]) -> Self {
        Self {
            keysym,
            command: Command::new(program, args),
        }
    }
}

/// Renders the `-b` listing line, e.g. `XF86AudioMute => amixer -q sset Master toggle`
impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", keysym_name(self.keysym), self.command)
    }
}

/// Ordered, immutable set of bindings
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<Binding>,
}

impl Bindings {
    pub fn new(entries: Vec<Binding>) -> Self {
        Self { entries }
    }

    /// The compiled-in media key table
    pub fn builtin() -> Self {
        Self::new(vec![
            Binding::new(
                Keysym::XF86_AudioRaiseVolume,
                "amixer",
                &["-q", "sset", "Master", "1+", "unmute"],
            ),
            Binding::new(
                Keysym::XF86_AudioLowerVolume,
                "amixer",
                &["-q", "sset", "Master", "1-", "unmute"],
            ),
            Binding::new(
                Keysym::XF86_AudioMute,
                "amixer",
                &["-q", "sset", "Master", "toggle"],
            ),
            Binding::new(Keysym::XF86_AudioPlay, "mpc", &["-q", "toggle"]),
            Binding::new(Keysym::XF86_AudioStop, "mpc", &["-q", "stop"]),
            Binding::new(Keysym::XF86_AudioNext, "mpc", &["-q", "next"]),
            Binding::new(Keysym::XF86_AudioPrev, "mpc", &["-q", "prev"]),
            Binding::new(Keysym::XF86_MonBrightnessUp, "xbacklight", &["-inc", "+10"]),
            Binding::new(Keysym::XF86_MonBrightnessDown, "xbacklight", &["-dec", "+10"]),
        ])
    }

    /// Find the command bound to `keysym`. First match wins; `NoSymbol`
    /// never matches.
    pub fn lookup(&self, keysym: Keysym) -> Option<&Command> {
        if keysym == Keysym::NoSymbol {
            return None;
        }
        self.entries
            .iter()
            .find(|b| b.keysym == keysym)
            .map(|b| &b.command)
    }

    /// Iterate over the bindings in table order
    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
