//! Control sequence recognition
//!
//! Recognizes the sequence families a terminal sends as input:
//! - CSI (`ESC [` / 0x9B): cursor and function keys, modified keys,
//!   mouse reports, cursor position and mode reports
//! - SS3 (`ESC O` / 0x8F): cursor keys, F1-F4 and the application keypad
//! - DCS (`ESC P` / 0x90) and OSC (`ESC ]` / 0x9D) strings
//!
//! Reference: https://invisible-island.net/xterm/ctlseqs/ctlseqs.html

use log::trace;

use crate::flags::Flags;
use crate::key::{
    CsiReport, Key, KeyCode, KeySym, ModeReport, Modifiers, MouseEventKind, MouseReport,
};
use crate::params::Params;
use crate::parser::Recognizer;
use crate::utf8;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;
/// 8-bit String Terminator
const ST: u8 = 0x9c;

/// Outcome of looking for a control sequence at the start of the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sequence {
    /// A complete event and the number of bytes it used
    Key(Key, usize),
    /// A valid prefix that needs more bytes
    Incomplete,
    /// The buffer does not start with a sequence handled here
    NotSequence,
}

/// Which string family an introducer opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringKind {
    Dcs,
    Osc,
}

impl Recognizer {
    /// Try to recognize a control sequence at the start of `buf`
    pub(crate) fn peek_sequence(&self, buf: &[u8], force: bool) -> Sequence {
        match buf {
            [ESC, b'[', ..] => self.peek_csi(buf, 2, force),
            [ESC, b'O', ..] => self.peek_ss3(buf, 2, force),
            [ESC, b'P', ..] => self.peek_string(buf, 2, StringKind::Dcs, force),
            [ESC, b']', ..] => self.peek_string(buf, 2, StringKind::Osc, force),
            [0x9b, ..] => self.peek_csi(buf, 1, force),
            [0x8f, ..] => self.peek_ss3(buf, 1, force),
            [0x90, ..] => self.peek_string(buf, 1, StringKind::Dcs, force),
            [0x9d, ..] => self.peek_string(buf, 1, StringKind::Osc, force),
            _ => Sequence::NotSequence,
        }
    }

    /// Scan `initial? params* intermediates* final`
    fn peek_csi(&self, buf: &[u8], introlen: usize, force: bool) -> Sequence {
        let mut pos = introlen;

        let initial = match buf.get(pos) {
            Some(&b @ b'<'..=b'?') => {
                pos += 1;
                Some(b)
            }
            _ => None,
        };

        let params_start = pos;
        while matches!(buf.get(pos), Some(b'0'..=b'9' | b';' | b':')) {
            pos += 1;
        }
        let params_end = pos;

        while matches!(buf.get(pos), Some(0x20..=0x2f)) {
            pos += 1;
        }
        let intermediates_end = pos;

        let params = Params::parse(&buf[params_start..params_end]);
        let intermediates = &buf[params_end..intermediates_end];

        let command = match buf.get(pos) {
            Some(&b @ 0x40..=0x7e) => b,
            Some(&b) => {
                // Cannot extend to a valid sequence; report what we have
                trace!("malformed CSI: unexpected byte {:#04x} at {}", b, pos);
                let report = CsiReport {
                    initial,
                    params,
                    intermediates: intermediates.to_vec(),
                    command: None,
                    raw: buf[..pos].to_vec(),
                };
                return Sequence::Key(Key::new(KeyCode::UnknownCsi(report)), pos);
            }
            None if force => {
                return Sequence::Key(Key::unicode('[').with_modifiers(Modifiers::ALT), introlen);
            }
            None => return Sequence::Incomplete,
        };
        let len = pos + 1;

        // X10 mouse: the three report bytes follow the final byte
        if command == b'M' && initial.is_none() && intermediates.is_empty() && params.len() < 3 {
            return self.peek_x10_mouse(buf, len, params, force);
        }

        match self.dispatch_csi(initial, &params, intermediates, command) {
            Some(key) => Sequence::Key(key, len),
            None => {
                trace!("unrecognised CSI {:?}", String::from_utf8_lossy(&buf[..len]));
                let report = CsiReport {
                    initial,
                    params,
                    intermediates: intermediates.to_vec(),
                    command: Some(command),
                    raw: buf[..len].to_vec(),
                };
                Sequence::Key(Key::new(KeyCode::UnknownCsi(report)), len)
            }
        }
    }

    fn dispatch_csi(
        &self,
        initial: Option<u8>,
        params: &Params,
        intermediates: &[u8],
        command: u8,
    ) -> Option<Key> {
        let modifiers = Modifiers::from_param(params.get_or(1, 1));

        match (initial, intermediates, command) {
            // CSI codepoint ; modifiers u
            (None, [], b'u') => {
                let c = char::from_u32(params.get(0)?)?;
                Some(self.emit_codepoint(c).with_modifiers(modifiers))
            }
            (None, [], b'~') => self.csi_function(params),
            // rxvt 1015 mouse: button code carries the X10 offset
            (None, [], b'M') if params.len() >= 3 => {
                let code = params.get_or(0, 0).saturating_sub(0x20);
                Some(mouse_key(code, params.get_or(2, 1), params.get_or(1, 1), false))
            }
            // SGR 1006 mouse
            (Some(b'<'), [], b'M' | b'm') if params.len() >= 3 => Some(mouse_key(
                params.get_or(0, 0),
                params.get_or(2, 1),
                params.get_or(1, 1),
                command == b'm',
            )),
            (Some(b'?'), [], b'R') if params.len() >= 2 => Some(Key::new(KeyCode::Position {
                line: params.get_or(0, 1),
                col: params.get_or(1, 1),
            })),
            (None | Some(b'?'), [b'$'], b'y') if params.len() >= 2 => {
                Some(Key::new(KeyCode::ModeReport(ModeReport {
                    initial,
                    mode: params.get_or(0, 0),
                    value: params.get_or(1, 0),
                })))
            }
            (None, [], _) => cursor_key(command).map(|key| key.with_modifiers(modifiers)),
            _ => None,
        }
    }

    /// `CSI number ; modifiers ~`
    fn csi_function(&self, params: &Params) -> Option<Key> {
        let number = params.get(0)?;
        let modifiers = Modifiers::from_param(params.get_or(1, 1));

        // xterm modifyOtherKeys: CSI 27 ; modifiers ; codepoint ~
        if number == 27 {
            let c = char::from_u32(params.get(2)?)?;
            return Some(self.emit_codepoint(c).with_modifiers(modifiers));
        }

        let key = match number {
            1 => Key::sym(KeySym::Find),
            2 => Key::sym(KeySym::Insert),
            3 => Key::sym(KeySym::Delete),
            4 => Key::sym(KeySym::Select),
            5 => Key::sym(KeySym::PageUp),
            6 => Key::sym(KeySym::PageDown),
            7 => Key::sym(KeySym::Home),
            8 => Key::sym(KeySym::End),
            11..=15 => Key::function(number - 10),
            17..=21 => Key::function(number - 11),
            23..=26 => Key::function(number - 12),
            28..=29 => Key::function(number - 13),
            31..=34 => Key::function(number - 14),
            _ => return None,
        };
        Some(key.with_modifiers(modifiers))
    }

    fn peek_x10_mouse(&self, buf: &[u8], csi_len: usize, params: Params, force: bool) -> Sequence {
        let mut values = [0u32; 3];
        let mut pos = csi_len;

        for value in values.iter_mut() {
            let decoded = if self.flags().contains(Flags::UTF8) {
                // 1005 mode: coordinates above 95 arrive UTF-8 encoded
                match utf8::decode(&buf[pos..]) {
                    Ok(Some((c, n))) => Some((u32::from(c), n)),
                    Ok(None) => None,
                    Err(_) => Some((u32::from(buf[pos]), 1)),
                }
            } else {
                buf.get(pos).map(|&b| (u32::from(b), 1))
            };

            match decoded {
                Some((v, n)) => {
                    *value = v;
                    pos += n;
                }
                None if force => {
                    let report = CsiReport {
                        initial: None,
                        params,
                        intermediates: Vec::new(),
                        command: Some(b'M'),
                        raw: buf[..csi_len].to_vec(),
                    };
                    return Sequence::Key(Key::new(KeyCode::UnknownCsi(report)), csi_len);
                }
                None => return Sequence::Incomplete,
            }
        }

        let [code, col, line] = values.map(|v| v.saturating_sub(0x20));
        Sequence::Key(mouse_key(code, line, col, false), pos)
    }

    fn peek_ss3(&self, buf: &[u8], introlen: usize, force: bool) -> Sequence {
        let Some(&command) = buf.get(introlen) else {
            return if force {
                Sequence::Key(Key::unicode('O').with_modifiers(Modifiers::ALT), introlen)
            } else {
                Sequence::Incomplete
            };
        };

        match cursor_key(command).or_else(|| self.keypad_key(command)) {
            Some(key) => Sequence::Key(key, introlen + 1),
            None => Sequence::NotSequence,
        }
    }

    /// Application keypad keys sent as SS3
    fn keypad_key(&self, command: u8) -> Option<Key> {
        let (sym, printed) = match command {
            b'M' => (KeySym::KpEnter, None),
            b'X' => (KeySym::KpEquals, Some('=')),
            b'j' => (KeySym::KpMult, Some('*')),
            b'k' => (KeySym::KpPlus, Some('+')),
            b'l' => (KeySym::KpComma, Some(',')),
            b'm' => (KeySym::KpMinus, Some('-')),
            b'n' => (KeySym::KpPeriod, Some('.')),
            b'o' => (KeySym::KpDiv, Some('/')),
            b'p' => (KeySym::Kp0, Some('0')),
            b'q' => (KeySym::Kp1, Some('1')),
            b'r' => (KeySym::Kp2, Some('2')),
            b's' => (KeySym::Kp3, Some('3')),
            b't' => (KeySym::Kp4, Some('4')),
            b'u' => (KeySym::Kp5, Some('5')),
            b'v' => (KeySym::Kp6, Some('6')),
            b'w' => (KeySym::Kp7, Some('7')),
            b'x' => (KeySym::Kp8, Some('8')),
            b'y' => (KeySym::Kp9, Some('9')),
            _ => return None,
        };

        match printed {
            Some(c) if self.flags().contains(Flags::CONVERTKP) => Some(Key::unicode(c)),
            _ => Some(Key::sym(sym)),
        }
    }

    /// DCS/OSC payload up to BEL, ST or `ESC \`
    fn peek_string(&self, buf: &[u8], introlen: usize, kind: StringKind, force: bool) -> Sequence {
        // 0x9C can be a UTF-8 continuation byte inside the payload
        let eight_bit_st = !self.flags().contains(Flags::UTF8);
        let mut pos = introlen;

        while pos < buf.len() {
            let terminator_len = match buf[pos] {
                BEL => 1,
                ST if eight_bit_st => 1,
                ESC if buf.get(pos + 1) == Some(&b'\\') => 2,
                ESC if pos + 1 == buf.len() => break,
                _ => 0,
            };
            if terminator_len > 0 {
                let payload = buf[introlen..pos].to_vec();
                let code = match kind {
                    StringKind::Dcs => KeyCode::Dcs(payload),
                    StringKind::Osc => KeyCode::Osc(payload),
                };
                return Sequence::Key(Key::new(code), pos + terminator_len);
            }
            pos += 1;
        }

        if force {
            Sequence::NotSequence
        } else {
            Sequence::Incomplete
        }
    }
}

/// Final bytes shared by CSI and SS3
fn cursor_key(command: u8) -> Option<Key> {
    let key = match command {
        b'A' => Key::sym(KeySym::Up),
        b'B' => Key::sym(KeySym::Down),
        b'C' => Key::sym(KeySym::Right),
        b'D' => Key::sym(KeySym::Left),
        b'E' => Key::sym(KeySym::Begin),
        b'F' => Key::sym(KeySym::End),
        b'H' => Key::sym(KeySym::Home),
        b'P' => Key::function(1),
        b'Q' => Key::function(2),
        b'R' => Key::function(3),
        b'S' => Key::function(4),
        b'Z' => Key::sym(KeySym::Tab).with_modifiers(Modifiers::SHIFT),
        _ => return None,
    };
    Some(key)
}

/// Decode an xterm mouse button code
///
/// Bits 0x04/0x08/0x10 are Shift/Meta/Ctrl, 0x20 marks motion, 0x40 the wheel.
fn mouse_key(code: u32, line: u32, col: u32, release: bool) -> Key {
    let modifiers = Modifiers::from_bits_truncate(((code & 0x1c) >> 2) as u8);
    let drag = code & 0x20 != 0;
    let pressed = if drag {
        MouseEventKind::Drag
    } else {
        MouseEventKind::Press
    };

    let (event, button) = match code & !0x3c {
        base @ 0..=2 => (pressed, base as u8 + 1),
        3 => (MouseEventKind::Release, 0),
        base @ (64 | 65) => (pressed, (base - 60) as u8),
        _ => (MouseEventKind::Unknown, 0),
    };
    let event = if release {
        MouseEventKind::Release
    } else {
        event
    };

    Key::new(KeyCode::Mouse(MouseReport {
        event,
        button,
        line,
        col,
    }))
    .with_modifiers(modifiers)
}
