//! Termkey - terminal key input decoding
//!
//! Reads the bytes a terminal sends and turns them into keys: Unicode
//! text, function and cursor keys with modifiers, mouse reports, cursor
//! position and mode reports, and DCS/OSC strings.
//!
//! - [`TermKey`]: a decoder session over a terminal device or pushed bytes
//! - [`Config`]: persisted decoder settings
//! - `termkey_parser` (re-exported): the pure recognizer and key formatting
//! - `termkey_tty` (re-exported as [`Tty`]): raw mode and device reads

pub mod buffer;
pub mod config;
pub mod error;
pub mod termkey;

pub use buffer::{InputBuffer, DEFAULT_BUFFER_SIZE};
pub use config::{default_config_path, Config, ConfigError, DEFAULT_WAIT_TIME_MS};
pub use error::{Error, ErrorCode, Result};
pub use termkey::{KeyResult, Lifecycle, ResultCode, TermKey};
pub use termkey_parser::{
    format_key, lookup_keyname, parse_key, CanonFlags, CsiReport, Flags, FormatFlags, Key, KeyCode,
    KeySym, ModeReport, Modifiers, MouseEventKind, MouseReport, Params,
};
pub use termkey_tty::{RawMode, Tty};

/// Major version of the decoding interface
pub const VERSION_MAJOR: u32 = 0;
/// Minor version of the decoding interface
pub const VERSION_MINOR: u32 = 1;

/// Check that this library provides the interface version a caller was built for
///
/// Majors must match and the requested minor must not be newer.
pub fn check_version(major: u32, minor: u32) -> Result<()> {
    if major == VERSION_MAJOR && minor <= VERSION_MINOR {
        Ok(())
    } else {
        Err(Error::VersionMismatch { major, minor })
    }
}
