//! Key canonicalisation
//!
//! Rules are applied in a fixed order: the space rule, then DEL/Backspace.
//! Each rule only touches keys the other leaves alone.

use crate::flags::CanonFlags;
use crate::key::{Key, KeyCode, KeySym};

/// Rewrite `key` in place according to `flags`
pub fn canonicalise(key: &mut Key, flags: CanonFlags) {
    if flags.contains(CanonFlags::SPACESYMBOL) {
        if key.code == KeyCode::Unicode(' ') {
            key.code = KeyCode::Sym(KeySym::Space);
        }
    } else if key.code == KeyCode::Sym(KeySym::Space) {
        key.code = KeyCode::Unicode(' ');
    }

    if flags.contains(CanonFlags::DELBS) && key.code == KeyCode::Sym(KeySym::Del) {
        key.code = KeyCode::Sym(KeySym::Backspace);
    }
}
