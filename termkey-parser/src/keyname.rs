//! Key symbol names
//!
//! The names used when formatting and parsing keys, e.g. `PageUp`, and
//! their `page up` spelling under [`FormatFlags::LOWERSPACE`].

use crate::flags::FormatFlags;
use crate::key::KeySym;

/// Every symbol with its canonical name, in symbol order
const NAMES: &[(KeySym, &str)] = &[
    (KeySym::Backspace, "Backspace"),
    (KeySym::Tab, "Tab"),
    (KeySym::Enter, "Enter"),
    (KeySym::Escape, "Escape"),
    (KeySym::Space, "Space"),
    (KeySym::Del, "DEL"),
    (KeySym::Up, "Up"),
    (KeySym::Down, "Down"),
    (KeySym::Left, "Left"),
    (KeySym::Right, "Right"),
    (KeySym::Begin, "Begin"),
    (KeySym::Find, "Find"),
    (KeySym::Insert, "Insert"),
    (KeySym::Delete, "Delete"),
    (KeySym::Select, "Select"),
    (KeySym::PageUp, "PageUp"),
    (KeySym::PageDown, "PageDown"),
    (KeySym::Home, "Home"),
    (KeySym::End, "End"),
    (KeySym::Cancel, "Cancel"),
    (KeySym::Clear, "Clear"),
    (KeySym::Close, "Close"),
    (KeySym::Command, "Command"),
    (KeySym::Copy, "Copy"),
    (KeySym::Exit, "Exit"),
    (KeySym::Help, "Help"),
    (KeySym::Mark, "Mark"),
    (KeySym::Message, "Message"),
    (KeySym::Move, "Move"),
    (KeySym::Open, "Open"),
    (KeySym::Options, "Options"),
    (KeySym::Print, "Print"),
    (KeySym::Redo, "Redo"),
    (KeySym::Reference, "Reference"),
    (KeySym::Refresh, "Refresh"),
    (KeySym::Replace, "Replace"),
    (KeySym::Restart, "Restart"),
    (KeySym::Resume, "Resume"),
    (KeySym::Save, "Save"),
    (KeySym::Suspend, "Suspend"),
    (KeySym::Undo, "Undo"),
    (KeySym::Kp0, "KP0"),
    (KeySym::Kp1, "KP1"),
    (KeySym::Kp2, "KP2"),
    (KeySym::Kp3, "KP3"),
    (KeySym::Kp4, "KP4"),
    (KeySym::Kp5, "KP5"),
    (KeySym::Kp6, "KP6"),
    (KeySym::Kp7, "KP7"),
    (KeySym::Kp8, "KP8"),
    (KeySym::Kp9, "KP9"),
    (KeySym::KpEnter, "KPEnter"),
    (KeySym::KpPlus, "KPPlus"),
    (KeySym::KpMinus, "KPMinus"),
    (KeySym::KpMult, "KPMult"),
    (KeySym::KpDiv, "KPDiv"),
    (KeySym::KpComma, "KPComma"),
    (KeySym::KpPeriod, "KPPeriod"),
    (KeySym::KpEquals, "KPEquals"),
];

impl KeySym {
    /// Canonical name, e.g. `PageUp`
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(sym, _)| *sym == self)
            .map_or("UNKNOWN", |&(_, name)| name)
    }

    /// Look up a symbol by its exact canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES.iter().find(|(_, n)| *n == name).map(|(sym, _)| *sym)
    }

    /// Every symbol, in declaration order
    pub fn all() -> impl Iterator<Item = KeySym> {
        NAMES.iter().map(|(sym, _)| *sym)
    }
}

/// `PageUp` -> `page up`; a space goes wherever a capital follows a lowercase letter
pub fn camel_to_spaces(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Find the symbol whose name is the longest prefix of `text`
///
/// Names are matched in the spelling `format` would produce. Returns the
/// symbol and the text after its name.
pub fn lookup_keyname(text: &str, format: FormatFlags) -> Option<(KeySym, &str)> {
    let lowerspace = format.contains(FormatFlags::LOWERSPACE);
    NAMES
        .iter()
        .filter_map(|&(sym, name)| {
            let len = if lowerspace {
                let spelled = camel_to_spaces(name);
                text.starts_with(spelled.as_str()).then_some(spelled.len())
            } else {
                text.starts_with(name).then_some(name.len())
            };
            len.map(|len| (sym, len))
        })
        .max_by_key(|&(_, len)| len)
        .map(|(sym, len)| (sym, &text[len..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip_all() {
        for sym in KeySym::all() {
            assert_eq!(KeySym::from_name(sym.name()), Some(sym));
        }
        assert_eq!(KeySym::all().count(), NAMES.len());
    }

    #[test]
    fn test_camel_to_spaces() {
        assert_eq!(camel_to_spaces("PageUp"), "page up");
        assert_eq!(camel_to_spaces("DEL"), "del");
        assert_eq!(camel_to_spaces("KPEnter"), "kpenter");
        assert_eq!(camel_to_spaces("Escape"), "escape");
    }

    #[test]
    fn test_lookup_longest() {
        assert_eq!(
            lookup_keyname("PageDown rest", FormatFlags::empty()),
            Some((KeySym::PageDown, " rest"))
        );
        assert_eq!(
            lookup_keyname("Delete", FormatFlags::empty()),
            Some((KeySym::Delete, ""))
        );
        assert_eq!(
            lookup_keyname("page up", FormatFlags::LOWERSPACE),
            Some((KeySym::PageUp, ""))
        );
        assert_eq!(lookup_keyname("x", FormatFlags::empty()), None);
    }
}
