//! Key formatting and parsing
//!
//! Renders keys as text in a chosen notation and parses that text back.
//!
//! | Flags          | Ctrl-a   | Alt-Up       | PageUp     |
//! |----------------|----------|--------------|------------|
//! | (none)         | `C-a`    | `A-Up`       | `PageUp`   |
//! | `VIM`          | `<C-a>`  | `<M-Up>`     | `<PageUp>` |
//! | `URWID`        | `ctrl a` | `meta up`    | `page up`  |
//! | `CARETCTRL`    | `^A`     | `A-Up`       | `PageUp`   |

use crate::canon::canonicalise;
use crate::error::Result;
use crate::flags::{CanonFlags, FormatFlags};
use crate::key::{Key, KeyCode, Modifiers, MouseEventKind};
use crate::keyname::{camel_to_spaces, lookup_keyname};

struct ModNames {
    shift: &'static str,
    alt: &'static str,
    ctrl: &'static str,
}

/// Indexed by LONGMOD + ALTISMETA * 2 + LOWERMOD * 4
const MOD_NAMES: [ModNames; 8] = [
    ModNames { shift: "S", alt: "A", ctrl: "C" },
    ModNames { shift: "Shift", alt: "Alt", ctrl: "Ctrl" },
    ModNames { shift: "S", alt: "M", ctrl: "C" },
    ModNames { shift: "Shift", alt: "Meta", ctrl: "Ctrl" },
    ModNames { shift: "s", alt: "a", ctrl: "c" },
    ModNames { shift: "shift", alt: "alt", ctrl: "ctrl" },
    ModNames { shift: "s", alt: "m", ctrl: "c" },
    ModNames { shift: "shift", alt: "meta", ctrl: "ctrl" },
];

fn mod_names(format: FormatFlags) -> &'static ModNames {
    let index = usize::from(format.contains(FormatFlags::LONGMOD))
        + usize::from(format.contains(FormatFlags::ALTISMETA)) * 2
        + usize::from(format.contains(FormatFlags::LOWERMOD)) * 4;
    &MOD_NAMES[index]
}

fn separator(format: FormatFlags) -> char {
    if format.contains(FormatFlags::SPACEMOD) {
        ' '
    } else {
        '-'
    }
}

/// Render `key` as text
///
/// Fails only when `format` holds unknown bits or both presets.
pub fn format_key(key: &Key, format: FormatFlags) -> Result<String> {
    let format = format.validate()?;
    let wrap = format.contains(FormatFlags::WRAPBRACKET)
        && (!key.is_unicode() || !key.modifiers.is_empty());

    if format.contains(FormatFlags::CARETCTRL) && key.modifiers == Modifiers::CTRL {
        let caret = match key.code {
            KeyCode::Unicode(c @ 'a'..='z') => Some(c.to_ascii_uppercase()),
            KeyCode::Unicode(c @ ('@' | '['..='_')) => Some(c),
            _ => None,
        };
        if let Some(c) = caret {
            return Ok(if wrap { format!("<^{c}>") } else { format!("^{c}") });
        }
    }

    let mut out = String::new();
    if wrap {
        out.push('<');
    }

    let names = mod_names(format);
    let sep = separator(format);
    for (flag, name) in [
        (Modifiers::ALT, names.alt),
        (Modifiers::CTRL, names.ctrl),
        (Modifiers::SHIFT, names.shift),
    ] {
        if key.modifiers.contains(flag) {
            out.push_str(name);
            out.push(sep);
        }
    }

    match &key.code {
        KeyCode::Unicode(c) if c.is_control() => out.push_str(&format!("\\x{:02x}", u32::from(*c))),
        KeyCode::Unicode(c) => out.push(*c),
        KeyCode::Sym(sym) if format.contains(FormatFlags::LOWERSPACE) => {
            out.push_str(&camel_to_spaces(sym.name()))
        }
        KeyCode::Sym(sym) => out.push_str(sym.name()),
        KeyCode::Function(n) => {
            let f = if format.contains(FormatFlags::LOWERSPACE) { 'f' } else { 'F' };
            out.push_str(&format!("{f}{n}"));
        }
        KeyCode::Mouse(mouse) => {
            let event = match mouse.event {
                MouseEventKind::Unknown => "Unknown",
                MouseEventKind::Press => "Press",
                MouseEventKind::Drag => "Drag",
                MouseEventKind::Release => "Release",
            };
            out.push_str(&format!("Mouse{}({})", event, mouse.button));
            if format.contains(FormatFlags::MOUSE_POS) {
                out.push_str(&format!(" @ ({},{})", mouse.col, mouse.line));
            }
        }
        KeyCode::Position { .. } => out.push_str("Position"),
        KeyCode::ModeReport(report) => {
            let initial = report.initial.map(char::from).map(String::from).unwrap_or_default();
            out.push_str(&format!("Mode({}{}={})", initial, report.mode, report.value));
        }
        KeyCode::Dcs(_) => out.push_str("DCS"),
        KeyCode::Osc(_) => out.push_str("OSC"),
        KeyCode::UnknownCsi(report) => match report.command {
            Some(command) => out.push_str(&format!("CSI {}", char::from(command))),
            None => out.push_str("CSI"),
        },
    }

    if wrap {
        out.push('>');
    }
    Ok(out)
}

/// Parse a key written in the notation `format` selects
///
/// Accepts what [`format_key`] produces for Unicode, symbol and function
/// keys. Returns the key, canonicalised with `canon`, and the unparsed
/// remainder of `text`.
pub fn parse_key(text: &str, format: FormatFlags, canon: CanonFlags) -> Option<(Key, &str)> {
    if format.contains(FormatFlags::WRAPBRACKET) {
        let wrapped = text.strip_prefix('<').and_then(|inner| {
            let (key, rest) = parse_key(inner, format - FormatFlags::WRAPBRACKET, canon)?;
            Some((key, rest.strip_prefix('>')?))
        });
        if wrapped.is_some() {
            return wrapped;
        }
    }

    if format.contains(FormatFlags::CARETCTRL) {
        if let Some(inner) = text.strip_prefix('^').filter(|inner| !inner.is_empty()) {
            let (key, rest) = parse_key(inner, format - FormatFlags::CARETCTRL, canon)?;
            let c = key
                .codepoint()
                .filter(|c| ('@'..='_').contains(c) && key.modifiers.is_empty())?;
            let key = Key::unicode(c.to_ascii_lowercase()).with_modifiers(Modifiers::CTRL);
            return Some((key, rest));
        }
    }

    let names = mod_names(format);
    let sep = separator(format);
    let mut modifiers = Modifiers::empty();
    let mut rest = text;
    while let Some((word, after)) = rest.split_once(sep) {
        let flag = if word == names.alt {
            Modifiers::ALT
        } else if word == names.ctrl {
            Modifiers::CTRL
        } else if word == names.shift {
            Modifiers::SHIFT
        } else {
            break;
        };
        modifiers |= flag;
        rest = after;
    }

    let (code, rest) = if let Some((sym, after)) = lookup_keyname(rest, format) {
        (KeyCode::Sym(sym), after)
    } else if let Some((number, after)) = parse_function(rest, format) {
        (KeyCode::Function(number), after)
    } else if let Some((c, after)) = parse_escaped_byte(rest) {
        (KeyCode::Unicode(c), after)
    } else {
        let c = rest.chars().next()?;
        (KeyCode::Unicode(c), &rest[c.len_utf8()..])
    };

    let mut key = Key::new(code).with_modifiers(modifiers);
    canonicalise(&mut key, canon);
    Some((key, rest))
}

/// `F12`, or `f12` under LOWERSPACE
fn parse_function(text: &str, format: FormatFlags) -> Option<(u32, &str)> {
    let prefix = if format.contains(FormatFlags::LOWERSPACE) { 'f' } else { 'F' };
    let digits = text.strip_prefix(prefix)?;
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let number = digits[..end].parse().ok()?;
    Some((number, &digits[end..]))
}

/// `\x7f` as written for control characters
fn parse_escaped_byte(text: &str) -> Option<(char, &str)> {
    let hex = text.strip_prefix("\\x")?;
    let digits = hex.get(..2)?;
    let byte = u8::from_str_radix(digits, 16).ok()?;
    Some((char::from(byte), &hex[2..]))
}
