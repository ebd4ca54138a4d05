//! Keysym <-> keycode translation
//!
//! Holds a snapshot of the server's keyboard mapping and answers the two
//! questions the daemon needs: which physical key produces a symbol, and
//! which base symbol a physical key produces.

use xkeysym::Keysym;

use crate::events::Keycode;

/// Keyboard mapping as returned by `GetKeyboardMapping`
///
/// `keysyms` is a flat table with `keysyms_per_keycode` columns per row,
/// one row per keycode starting at `min_keycode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    min_keycode: Keycode,
    keysyms_per_keycode: u8,
    keysyms: Vec<Keysym>,
}

impl Keymap {
    pub fn new(min_keycode: Keycode, keysyms_per_keycode: u8, keysyms: Vec<Keysym>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode,
            keysyms,
        }
    }

    /// Build a keymap from raw protocol values
    pub fn from_raw(min_keycode: Keycode, keysyms_per_keycode: u8, raw: &[u32]) -> Self {
        Self::new(
            min_keycode,
            keysyms_per_keycode,
            raw.iter().map(|&k| Keysym::new(k)).collect(),
        )
    }

    fn rows(&self) -> usize {
        match self.keysyms_per_keycode {
            0 => 0,
            per => self.keysyms.len() / per as usize,
        }
    }

    fn at(&self, row: usize, col: usize) -> Keysym {
        self.keysyms
            .get(row * self.keysyms_per_keycode as usize + col)
            .copied()
            .unwrap_or(Keysym::NoSymbol)
    }

    /// First keycode producing `keysym` in any column.
    ///
    /// Columns are scanned in order (every keycode's first column before
    /// any second column) so unshifted positions are preferred.
    pub fn keycode_for(&self, keysym: Keysym) -> Option<Keycode> {
        if keysym == Keysym::NoSymbol {
            return None;
        }
        let rows = self.rows();
        for col in 0..self.keysyms_per_keycode as usize {
            for row in 0..rows {
                if self.at(row, col) == keysym {
                    return u8::try_from(row + self.min_keycode as usize).ok();
                }
            }
        }
        None
    }

    /// Base (unshifted) keysym for `keycode`, ignoring modifier state
    pub fn keysym_for(&self, keycode: Keycode) -> Keysym {
        if keycode < self.min_keycode || self.keysyms_per_keycode == 0 {
            return Keysym::NoSymbol;
        }
        let row = (keycode - self.min_keycode) as usize;
        if row >= self.rows() {
            return Keysym::NoSymbol;
        }
        self.at(row, 0)
    }
}

/// Canonical X name for a keysym, as `XKeysymToString` prints it
pub fn keysym_name(keysym: Keysym) -> String {
    if keysym == Keysym::NoSymbol {
        return "NoSymbol".to_string();
    }
    match keysym.name() {
        Some(name) => canonical_name(name),
        None => format!("0x{:08x}", keysym.raw()),
    }
}

/// Strip the `XK_` table prefix and fold the vendor prefix back into the
/// X spelling (`XF86_AudioMute` -> `XF86AudioMute`).
fn canonical_name(name: &str) -> String {
    let name = name.strip_prefix("XK_").unwrap_or(name);
    for vendor in ["XF86XK_", "XF86_"] {
        if let Some(rest) = name.strip_prefix(vendor) {
            return format!("XF86{}", rest);
        }
    }
    name.to_string()
}
