//! Termkey Parser - terminal key input recognition
//!
//! This crate turns the bytes a terminal sends for keyboard and mouse input
//! into structured [`Key`] events. It is pure: it never touches a device
//! and keeps no state between calls, so the caller decides when to wait
//! for more bytes.
//!
//! It provides:
//! - [`Recognizer`]: CSI, SS3, DCS and OSC sequences, UTF-8 and 8-bit text
//! - [`canonicalise`]: Space and DEL/Backspace equivalences
//! - [`format_key`] / [`parse_key`]: vim, urwid and plain key notations
//!
//! Reference: https://invisible-island.net/xterm/ctlseqs/ctlseqs.html

mod canon;
mod csi;
mod error;
mod flags;
mod format;
mod key;
mod keyname;
mod params;
mod parser;
pub mod utf8;

pub use canon::canonicalise;
pub use error::{Error, Result};
pub use flags::{CanonFlags, Flags, FormatFlags};
pub use format::{format_key, parse_key};
pub use key::{CsiReport, Key, KeyCode, KeySym, ModeReport, Modifiers, MouseEventKind, MouseReport};
pub use keyname::{camel_to_spaces, lookup_keyname};
pub use params::{Params, MAX_PARAMS};
pub use parser::{Peek, Recognizer};
