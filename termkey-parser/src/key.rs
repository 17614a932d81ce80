//! Decoded key events
//!
//! A [`Key`] is a [`KeyCode`] plus the modifiers held while it was pressed.
//! Each code variant carries only the payload that kind of event needs.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;

use crate::params::Params;

bitflags! {
    /// Modifier keys held during a key event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift key
        const SHIFT = 1 << 0;
        /// Alt/Meta key
        const ALT   = 1 << 1;
        /// Control key
        const CTRL  = 1 << 2;
    }
}

impl Modifiers {
    /// Decode an xterm modifier parameter (`1 + bits`)
    pub fn from_param(param: u32) -> Self {
        let bits = param.saturating_sub(1).min(u32::from(u8::MAX)) as u8;
        Modifiers::from_bits_truncate(bits)
    }
}

/// Named, non-printing keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeySym {
    Backspace,
    Tab,
    Enter,
    Escape,
    Space,
    Del,
    Up,
    Down,
    Left,
    Right,
    Begin,
    Find,
    Insert,
    Delete,
    Select,
    PageUp,
    PageDown,
    Home,
    End,
    Cancel,
    Clear,
    Close,
    Command,
    Copy,
    Exit,
    Help,
    Mark,
    Message,
    Move,
    Open,
    Options,
    Print,
    Redo,
    Reference,
    Refresh,
    Replace,
    Restart,
    Resume,
    Save,
    Suspend,
    Undo,
    Kp0,
    Kp1,
    Kp2,
    Kp3,
    Kp4,
    Kp5,
    Kp6,
    Kp7,
    Kp8,
    Kp9,
    KpEnter,
    KpPlus,
    KpMinus,
    KpMult,
    KpDiv,
    KpComma,
    KpPeriod,
    KpEquals,
}

/// What a mouse report describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MouseEventKind {
    Unknown,
    Press,
    Drag,
    Release,
}

/// A decoded mouse report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MouseReport {
    pub event: MouseEventKind,
    /// 1-3 for the main buttons, 4/5 for the wheel, 0 when unknown
    pub button: u8,
    /// 1-based row
    pub line: u32,
    /// 1-based column
    pub col: u32,
}

/// DECRPM mode report (`CSI ? mode ; value $ y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModeReport {
    /// `?` for DEC private modes
    pub initial: Option<u8>,
    pub mode: u32,
    pub value: u32,
}

/// A CSI sequence with no key meaning
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsiReport {
    /// Leading `<`, `=`, `>` or `?`
    pub initial: Option<u8>,
    pub params: Params,
    pub intermediates: Vec<u8>,
    /// Final byte; `None` when the sequence was malformed
    pub command: Option<u8>,
    /// Every byte consumed for this event, introducer included
    pub raw: Vec<u8>,
}

/// The kind and payload of a key event
///
/// Variant order is the primary ordering used by [`Key`]'s `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyCode {
    /// A character
    Unicode(char),
    /// Function key, `Function(1)` is F1
    Function(u32),
    /// A named key
    Sym(KeySym),
    Mouse(MouseReport),
    /// Cursor position report
    Position { line: u32, col: u32 },
    ModeReport(ModeReport),
    /// Device control string payload
    Dcs(Vec<u8>),
    /// Operating system command payload
    Osc(Vec<u8>),
    UnknownCsi(CsiReport),
}

/// A decoded key event
#[derive(Debug, Clone)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    /// Unicode key assembled from UTF-8 input; does not affect comparison
    pub utf8: bool,
}

impl Key {
    /// Create a key with no modifiers
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            utf8: false,
        }
    }

    /// Unicode key
    pub fn unicode(c: char) -> Self {
        Self::new(KeyCode::Unicode(c))
    }

    /// Named key
    pub fn sym(sym: KeySym) -> Self {
        Self::new(KeyCode::Sym(sym))
    }

    /// Function key
    pub fn function(number: u32) -> Self {
        Self::new(KeyCode::Function(number))
    }

    /// Add modifiers
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn is_unicode(&self) -> bool {
        matches!(self.code, KeyCode::Unicode(_))
    }

    /// The character of a Unicode key
    pub fn codepoint(&self) -> Option<char> {
        match self.code {
            KeyCode::Unicode(c) => Some(c),
            _ => None,
        }
    }

    /// The symbol of a named key
    pub fn keysym(&self) -> Option<KeySym> {
        match self.code {
            KeyCode::Sym(sym) => Some(sym),
            _ => None,
        }
    }

    pub fn mouse(&self) -> Option<&MouseReport> {
        match &self.code {
            KeyCode::Mouse(report) => Some(report),
            _ => None,
        }
    }

    /// `(line, col)` of a cursor position report
    pub fn position(&self) -> Option<(u32, u32)> {
        match self.code {
            KeyCode::Position { line, col } => Some((line, col)),
            _ => None,
        }
    }

    pub fn mode_report(&self) -> Option<&ModeReport> {
        match &self.code {
            KeyCode::ModeReport(report) => Some(report),
            _ => None,
        }
    }

    pub fn csi(&self) -> Option<&CsiReport> {
        match &self.code {
            KeyCode::UnknownCsi(report) => Some(report),
            _ => None,
        }
    }

    /// Payload of a DCS or OSC string
    pub fn string(&self) -> Option<&[u8]> {
        match &self.code {
            KeyCode::Dcs(data) | KeyCode::Osc(data) => Some(data),
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.modifiers == other.modifiers
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
        self.modifiers.hash(state);
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code
            .cmp(&other.code)
            .then_with(|| self.modifiers.bits().cmp(&other.modifiers.bits()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_from_param() {
        assert_eq!(Modifiers::from_param(1), Modifiers::empty());
        assert_eq!(Modifiers::from_param(2), Modifiers::SHIFT);
        assert_eq!(Modifiers::from_param(5), Modifiers::CTRL);
        assert_eq!(Modifiers::from_param(8), Modifiers::all());
        assert_eq!(Modifiers::from_param(0), Modifiers::empty());
    }

    #[test]
    fn test_utf8_flag_ignored_by_eq() {
        let mut a = Key::unicode('é');
        let b = Key::unicode('é');
        a.utf8 = true;
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_kind_order() {
        let unicode = Key::unicode('z');
        let function = Key::function(1);
        let sym = Key::sym(KeySym::Backspace);
        let csi = Key::new(KeyCode::UnknownCsi(CsiReport {
            initial: None,
            params: Params::default(),
            intermediates: Vec::new(),
            command: Some(b'x'),
            raw: b"\x1b[x".to_vec(),
        }));
        assert!(unicode < function);
        assert!(function < sym);
        assert!(sym < csi);
    }

    #[test]
    fn test_modifiers_order_last() {
        let plain = Key::unicode('a');
        let ctrl = Key::unicode('a').with_modifiers(Modifiers::CTRL);
        let shift_b = Key::unicode('b').with_modifiers(Modifiers::SHIFT);
        assert!(plain < ctrl);
        assert!(ctrl < shift_b);
    }

    #[test]
    fn test_accessors() {
        let key = Key::new(KeyCode::Position { line: 3, col: 7 });
        assert_eq!(key.position(), Some((3, 7)));
        assert!(key.mouse().is_none());
        let osc = Key::new(KeyCode::Osc(b"0;title".to_vec()));
        assert_eq!(osc.string(), Some(&b"0;title"[..]));
    }
}
