//! Error types for the key decoder

use termkey_parser::FormatFlags;
use thiserror::Error;

/// Decoder error type
#[derive(Error, Debug)]
pub enum Error {
    /// Pushed bytes did not all fit; the first `accepted` were kept
    #[error("input buffer full: accepted {accepted} of {requested} bytes")]
    BufferOverflow { accepted: usize, requested: usize },

    /// The buffer cannot shrink below its unconsumed contents
    #[error("cannot resize buffer to {requested} bytes while {buffered} are unconsumed")]
    BufferInUse { requested: usize, buffered: usize },

    /// Malformed input under the active encoding
    ///
    /// Session decoding substitutes U+FFFD and never returns this; it comes
    /// from converting a [`termkey_parser::utf8::decode`] error.
    #[error("invalid encoding: {skip} byte(s) skipped")]
    InvalidEncoding { skip: usize },

    /// Format flags that cannot be combined
    #[error("unsupported format flags: {0:?}")]
    InvalidFormatFlags(FormatFlags),

    /// A signal interrupted a blocking wait
    #[error("wait interrupted by a signal")]
    Interrupted,

    /// The caller needs a newer or different protocol version
    #[error("version {major}.{minor} requested, {}.{} available", crate::VERSION_MAJOR, crate::VERSION_MINOR)]
    VersionMismatch { major: u32, minor: u32 },

    /// Terminal device failure
    #[error("terminal error: {0}")]
    Tty(#[source] termkey_tty::Error),
}

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Copyable error classification, kept as the instance's last error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BufferOverflow,
    BufferInUse,
    InvalidEncoding,
    InvalidFormatFlags,
    InterruptedWait,
    /// Input ended; reported alongside a `KeyResult::Eof`
    StreamEnd,
    VersionMismatch,
    Io,
}

impl Error {
    /// Classification of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::BufferOverflow { .. } => ErrorCode::BufferOverflow,
            Error::BufferInUse { .. } => ErrorCode::BufferInUse,
            Error::InvalidEncoding { .. } => ErrorCode::InvalidEncoding,
            Error::InvalidFormatFlags(_) => ErrorCode::InvalidFormatFlags,
            Error::Interrupted => ErrorCode::InterruptedWait,
            Error::VersionMismatch { .. } => ErrorCode::VersionMismatch,
            Error::Tty(_) => ErrorCode::Io,
        }
    }
}

impl From<termkey_parser::Error> for Error {
    fn from(e: termkey_parser::Error) -> Self {
        match e {
            termkey_parser::Error::InvalidEncoding { skip } => Error::InvalidEncoding { skip },
            termkey_parser::Error::InvalidFormatFlags(flags) => Error::InvalidFormatFlags(flags),
        }
    }
}

impl From<termkey_tty::Error> for Error {
    fn from(e: termkey_tty::Error) -> Self {
        match e {
            termkey_tty::Error::Interrupted => Error::Interrupted,
            other => Error::Tty(other),
        }
    }
}
