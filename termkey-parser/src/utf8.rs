//! UTF-8 decoding for key input
//!
//! Decodes one character from the front of a byte slice, distinguishing a
//! sequence that is merely cut short from one that can never be valid.

use crate::error::{Error, Result};

/// Replacement for input that does not decode
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Decode the character at the start of `bytes`
///
/// Returns the character and its length, `Ok(None)` when more bytes are
/// needed, or `InvalidEncoding` with the number of bytes to skip.
pub fn decode(bytes: &[u8]) -> Result<Option<(char, usize)>> {
    let Some(&lead) = bytes.first() else {
        return Ok(None);
    };

    // (sequence length, payload bits of the lead byte, smallest legal value)
    let (len, mut cp, min) = match lead {
        0x00..=0x7F => return Ok(Some((char::from(lead), 1))),
        0xC0..=0xDF => (2, u32::from(lead & 0x1F), 0x80),
        0xE0..=0xEF => (3, u32::from(lead & 0x0F), 0x800),
        0xF0..=0xF7 => (4, u32::from(lead & 0x07), 0x10000),
        _ => return Err(Error::InvalidEncoding { skip: 1 }),
    };

    for i in 1..len {
        match bytes.get(i) {
            None => return Ok(None),
            Some(&byte) if byte & 0b1100_0000 == 0b1000_0000 => {
                cp = (cp << 6) | u32::from(byte & 0x3F);
            }
            // The offending byte may start the next character
            Some(_) => return Err(Error::InvalidEncoding { skip: i }),
        }
    }

    // Overlong forms and surrogates
    if cp < min || (0xD800..=0xDFFF).contains(&cp) {
        return Err(Error::InvalidEncoding { skip: len });
    }

    char::from_u32(cp)
        .map(|c| Some((c, len)))
        .ok_or(Error::InvalidEncoding { skip: len })
}
