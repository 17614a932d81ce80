//! Flag sets controlling decoding, canonicalisation and formatting
//!
//! All three sets serialise as `"A | B"` strings so they can live in a
//! JSON configuration file.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Decoder behaviour flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Flags: u32 {
        /// Do not rewrite Tab, Enter, Escape and DEL into symbols
        const NOINTERPRET = 1 << 0;
        /// Report application keypad keys as the characters they print
        const CONVERTKP   = 1 << 1;
        /// Every byte is a key, no sequence recognition
        const RAW         = 1 << 2;
        /// Assemble UTF-8 codepoints
        const UTF8        = 1 << 3;
        /// Leave the device's termios settings alone
        const NOTERMIOS   = 1 << 4;
        /// Report a literal space as the Space symbol
        const SPACESYMBOL = 1 << 5;
        /// Deliver Ctrl-C as a key instead of SIGINT
        const CTRLC       = 1 << 6;
        /// Retry a wait interrupted by a signal
        const EINTR       = 1 << 7;
        /// Do not start on construction
        const NOSTART     = 1 << 8;
    }
}

bitflags! {
    /// Canonicalisation rules applied to decoded keys
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CanonFlags: u32 {
        /// Space is the Space symbol rather than U+0020
        const SPACESYMBOL = 1 << 0;
        /// DEL is reported as Backspace
        const DELBS       = 1 << 1;
    }
}

bitflags! {
    /// Formatting options for [`crate::format_key`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FormatFlags: u32 {
        /// `Ctrl-` rather than `C-`
        const LONGMOD     = 1 << 0;
        /// `^X` for Ctrl-letters
        const CARETCTRL   = 1 << 1;
        /// `M-` / `Meta-` for Alt
        const ALTISMETA   = 1 << 2;
        /// `<...>` around anything but a plain character
        const WRAPBRACKET = 1 << 3;
        /// Space between modifiers and key instead of `-`
        const SPACEMOD    = 1 << 4;
        /// Lowercase modifier names
        const LOWERMOD    = 1 << 5;
        /// `page up` instead of `PageUp`
        const LOWERSPACE  = 1 << 6;
        /// Append mouse coordinates
        const MOUSE_POS   = 1 << 8;

        /// Vim key notation
        const VIM   = Self::ALTISMETA.bits() | Self::WRAPBRACKET.bits();
        /// Urwid key notation
        const URWID = Self::LONGMOD.bits()
            | Self::ALTISMETA.bits()
            | Self::LOWERMOD.bits()
            | Self::LOWERSPACE.bits()
            | Self::SPACEMOD.bits();
    }
}

impl Flags {
    /// Flags that only matter when raw mode is (re)applied to the device
    pub const TERMIOS_AFFECTING: Flags = Flags::NOTERMIOS.union(Flags::CTRLC);
}

impl FormatFlags {
    /// Check that the flags can be honoured together
    pub fn validate(self) -> crate::Result<Self> {
        let unknown = self.bits() & !FormatFlags::all().bits() != 0;
        let both_presets = self.contains(FormatFlags::VIM) && self.contains(FormatFlags::URWID);
        if unknown || both_presets {
            return Err(crate::Error::InvalidFormatFlags(self));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(FormatFlags::VIM.contains(FormatFlags::WRAPBRACKET));
        assert!(!FormatFlags::URWID.contains(FormatFlags::WRAPBRACKET));
        assert!(FormatFlags::URWID.contains(FormatFlags::LOWERSPACE));
    }

    #[test]
    fn test_validate() {
        assert!(FormatFlags::VIM.validate().is_ok());
        assert!(FormatFlags::empty().validate().is_ok());
        assert!((FormatFlags::VIM | FormatFlags::URWID).validate().is_err());
        assert!(FormatFlags::from_bits_retain(1 << 7).validate().is_err());
    }

    #[test]
    fn test_flags_text_form() {
        let mut text = String::new();
        bitflags::parser::to_writer(&(Flags::UTF8 | Flags::CTRLC), &mut text).unwrap();
        assert_eq!(text, "UTF8 | CTRLC");
        let parsed: Flags = bitflags::parser::from_str(&text).unwrap();
        assert_eq!(parsed, Flags::UTF8 | Flags::CTRLC);
    }
}
