//! Key sequence recognizer
//!
//! Classifies the front of an input buffer as a complete key, an incomplete
//! prefix that needs more bytes, or nothing at all. The recognizer holds no
//! state between calls: the caller owns the buffer and consumes exactly the
//! number of bytes reported for each key.
//!
//! Ambiguity between a bare key and the start of a longer sequence (ESC
//! versus `ESC [ A`) is never guessed. Without `force` such a prefix is
//! reported as [`Peek::Again`]; with `force` the shortest interpretation
//! wins.

use log::trace;

use crate::canon::canonicalise;
use crate::csi::Sequence;
use crate::error::Error;
use crate::flags::{CanonFlags, Flags};
use crate::key::{Key, KeySym, Modifiers};
use crate::utf8::{self, REPLACEMENT_CHAR};

const ESC: u8 = 0x1b;

/// Result of examining the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peek {
    /// A complete key and the number of bytes it used
    Key { key: Key, consumed: usize },
    /// The buffer holds an incomplete but valid prefix
    Again,
    /// The buffer is empty
    Empty,
}

/// The key recognizer
#[derive(Debug, Clone, Default)]
pub struct Recognizer {
    flags: Flags,
    canon_flags: CanonFlags,
}

impl Recognizer {
    /// Create a recognizer
    pub fn new(flags: Flags, canon_flags: CanonFlags) -> Self {
        let mut recognizer = Self {
            flags,
            canon_flags,
        };
        recognizer.set_flags(flags);
        recognizer
    }

    /// Get decoder flags
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Set decoder flags; SPACESYMBOL is mirrored into the canon flags
    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
        self.canon_flags
            .set(CanonFlags::SPACESYMBOL, flags.contains(Flags::SPACESYMBOL));
    }

    /// Get canonicalisation flags
    pub fn canon_flags(&self) -> CanonFlags {
        self.canon_flags
    }

    /// Set canonicalisation flags; SPACESYMBOL is mirrored into the decoder flags
    pub fn set_canon_flags(&mut self, canon_flags: CanonFlags) {
        self.canon_flags = canon_flags;
        self.flags.set(
            Flags::SPACESYMBOL,
            canon_flags.contains(CanonFlags::SPACESYMBOL),
        );
    }

    /// Apply the active canonicalisation rules to `key`
    pub fn canonicalise(&self, key: &mut Key) {
        canonicalise(key, self.canon_flags);
    }

    /// Examine the front of `buf`
    ///
    /// With `force`, a non-empty buffer always yields a key.
    pub fn peek(&self, buf: &[u8], force: bool) -> Peek {
        let Some(&first) = buf.first() else {
            return Peek::Empty;
        };

        if self.flags.contains(Flags::RAW) {
            let mut key = Key::unicode(char::from(first));
            self.canonicalise(&mut key);
            return Peek::Key { key, consumed: 1 };
        }

        // Each leading ESC that does not open a sequence adds Alt to
        // whatever follows it
        let mut escapes = 0;
        loop {
            let rest = &buf[escapes..];
            let (mut key, len) = match self.peek_sequence(rest, force) {
                Sequence::Key(key, len) => (key, len),
                Sequence::Incomplete => return Peek::Again,
                Sequence::NotSequence => match rest {
                    [ESC] if !force => return Peek::Again,
                    [ESC] => (self.emit_codepoint('\x1b'), 1),
                    [ESC, ..] => {
                        escapes += 1;
                        continue;
                    }
                    _ => match self.peek_simple(rest, force) {
                        Some(found) => found,
                        None => return Peek::Again,
                    },
                },
            };

            if escapes > 0 {
                key.modifiers |= Modifiers::ALT;
            }
            self.canonicalise(&mut key);
            return Peek::Key {
                key,
                consumed: escapes + len,
            };
        }
    }

    /// A single character; `None` when a UTF-8 sequence is cut short
    fn peek_simple(&self, buf: &[u8], force: bool) -> Option<(Key, usize)> {
        let first = buf[0];

        // C0, ASCII and C1 bytes are never part of a multi-byte character
        if first < 0xa0 {
            return Some((self.emit_codepoint(char::from(first)), 1));
        }

        if !self.flags.contains(Flags::UTF8) {
            return Some((Key::unicode(char::from(first)), 1));
        }

        let (c, len) = match utf8::decode(buf) {
            Ok(Some(decoded)) => decoded,
            Ok(None) if !force => return None,
            Ok(None) => {
                trace!("truncated UTF-8 sequence {:02x?}", buf);
                (REPLACEMENT_CHAR, buf.len())
            }
            Err(Error::InvalidEncoding { skip }) => {
                trace!("invalid UTF-8 sequence {:02x?}", &buf[..skip]);
                (REPLACEMENT_CHAR, skip.max(1))
            }
            Err(_) => (REPLACEMENT_CHAR, 1),
        };

        let mut key = self.emit_codepoint(c);
        key.utf8 = true;
        Some((key, len))
    }

    /// Turn a codepoint into a key, naming the control characters
    pub(crate) fn emit_codepoint(&self, c: char) -> Key {
        let interpret = !self.flags.contains(Flags::NOINTERPRET);

        match u32::from(c) {
            // NUL is Ctrl-Space
            0x00 => Key::sym(KeySym::Space).with_modifiers(Modifiers::CTRL),
            0x09 if interpret => Key::sym(KeySym::Tab),
            0x0d if interpret => Key::sym(KeySym::Enter),
            0x1b if interpret => Key::sym(KeySym::Escape),
            // Ctrl-letters are reported lowercase so Shift stays meaningful
            cp @ 0x01..=0x1a => {
                Key::unicode(char::from(cp as u8 + 0x60)).with_modifiers(Modifiers::CTRL)
            }
            cp @ 0x1b..=0x1f => {
                Key::unicode(char::from(cp as u8 + 0x40)).with_modifiers(Modifiers::CTRL)
            }
            0x7f if interpret => Key::sym(KeySym::Del),
            cp @ 0x80..=0x9f => Key::unicode(char::from(cp as u8 - 0x40))
                .with_modifiers(Modifiers::CTRL | Modifiers::ALT),
            _ => Key::unicode(c),
        }
    }
}
