//! Error types for terminal device operations

use std::io;
use thiserror::Error;

/// Terminal device error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// tcgetattr failed on a terminal
    #[error("failed to read terminal attributes: {0}")]
    GetAttr(#[source] nix::Error),

    /// tcsetattr failed
    #[error("failed to set terminal attributes: {0}")]
    SetAttr(#[source] nix::Error),

    /// poll failed
    #[error("poll failed: {0}")]
    Poll(#[source] nix::Error),

    /// A signal arrived while waiting or reading
    #[error("interrupted by a signal")]
    Interrupted,
}

/// Result type for terminal device operations
pub type Result<T> = std::result::Result<T, Error>;
