//! Error types for key decoding and formatting

use thiserror::Error;

use crate::flags::FormatFlags;

/// Parser error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed byte sequence under the active encoding
    #[error("invalid encoding: {skip} byte(s) do not form a character")]
    InvalidEncoding {
        /// Bytes to discard to resynchronise (always at least 1)
        skip: usize,
    },

    /// Format flags that cannot be combined
    #[error("unsupported format flags: {0:?}")]
    InvalidFormatFlags(FormatFlags),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, Error>;
