//! Termkey TTY - terminal device attachment
//!
//! Owns the input side of a terminal device for a key decoder:
//! - Raw mode (no line buffering, no echo) with the original settings
//!   restored on demand or on drop
//! - Readiness polling with an optional deadline
//! - Plain reads into caller-provided buffers
//!
//! Reference: https://www.man7.org/linux/man-pages/man3/termios.3.html

mod error;
mod tty;

pub use error::{Error, Result};
pub use tty::{RawMode, Tty};
