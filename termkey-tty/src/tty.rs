//! Terminal device handle
//!
//! Raw mode here means: no canonical line editing, no echo, no XON/XOFF
//! flow control, and reads that return as soon as one byte is available.
//! Signal keys are handled according to [`RawMode::ctrlc`].

use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::time::Duration;

use log::{debug, warn};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::termios::{self, InputFlags, LocalFlags, SetArg, SpecialCharacterIndices, Termios};

use crate::error::{Error, Result};

/// Options for entering raw mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawMode {
    /// Deliver Ctrl-C (and Ctrl-\, Ctrl-Z) as input instead of signals
    pub ctrlc: bool,
}

/// The input side of a terminal device
pub struct Tty {
    /// File wrapper for I/O
    file: File,
    /// Settings to restore when leaving raw mode
    saved: Option<Termios>,
}

impl Tty {
    /// Attach to a duplicate of standard input
    pub fn stdin() -> Result<Self> {
        let fd = io::stdin().as_fd().try_clone_to_owned()?;
        Ok(Self::from_fd(fd))
    }

    /// Attach to an open descriptor
    pub fn from_fd(fd: OwnedFd) -> Self {
        Self {
            file: File::from(fd),
            saved: None,
        }
    }

    /// Whether the descriptor refers to a terminal
    pub fn is_terminal(&self) -> bool {
        self.file.is_terminal()
    }

    /// Whether raw mode is currently applied
    pub fn is_raw(&self) -> bool {
        self.saved.is_some()
    }

    /// Put the device into raw mode
    ///
    /// Returns `false` without changing anything when the descriptor is not
    /// a terminal. Calling this while already raw does nothing.
    pub fn enter_raw_mode(&mut self, mode: RawMode) -> Result<bool> {
        if self.saved.is_some() {
            return Ok(true);
        }

        let original = match termios::tcgetattr(self.file.as_fd()) {
            Ok(original) => original,
            Err(Errno::ENOTTY) | Err(Errno::ENODEV) => {
                debug!("input is not a terminal; leaving its settings alone");
                return Ok(false);
            }
            Err(e) => return Err(Error::GetAttr(e)),
        };

        let mut raw = original.clone();
        raw.input_flags &= !InputFlags::IXON;
        raw.local_flags &= !(LocalFlags::ICANON | LocalFlags::ECHO);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

        if mode.ctrlc {
            // No signal keys at all
            raw.local_flags &= !LocalFlags::ISIG;
        } else {
            // Keep Ctrl-C as SIGINT but free Ctrl-\ and Ctrl-Z
            raw.control_chars[SpecialCharacterIndices::VQUIT as usize] = nix::libc::_POSIX_VDISABLE;
            raw.control_chars[SpecialCharacterIndices::VSUSP as usize] = nix::libc::_POSIX_VDISABLE;
        }

        termios::tcsetattr(self.file.as_fd(), SetArg::TCSANOW, &raw).map_err(Error::SetAttr)?;
        debug!("entered raw mode (ctrlc: {})", mode.ctrlc);
        self.saved = Some(original);
        Ok(true)
    }

    /// Restore the settings saved by [`Tty::enter_raw_mode`]
    pub fn restore(&mut self) -> Result<()> {
        if let Some(original) = self.saved.take() {
            termios::tcsetattr(self.file.as_fd(), SetArg::TCSANOW, &original)
                .map_err(Error::SetAttr)?;
            debug!("restored terminal settings");
        }
        Ok(())
    }

    /// Wait until the device has input or reports hangup
    ///
    /// `None` waits indefinitely. Returns `false` on timeout.
    pub fn poll_readable(&self, timeout: Option<Duration>) -> Result<bool> {
        let timeout = match timeout {
            None => PollTimeout::NONE,
            Some(timeout) => PollTimeout::from(timeout_millis(timeout)),
        };

        let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, timeout) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(fds[0].revents().is_some_and(|r| {
                r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR)
            })),
            Err(Errno::EINTR) => Err(Error::Interrupted),
            Err(e) => Err(Error::Poll(e)),
        }
    }

    /// Read available bytes; `Ok(0)` means end of input
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.file.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(Error::Interrupted),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Milliseconds for poll(2), rounded up so short waits do not spin
fn timeout_millis(timeout: Duration) -> u16 {
    let millis = timeout.as_nanos().div_ceil(1_000_000);
    millis.min(u128::from(u16::MAX)) as u16
}

impl AsFd for Tty {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl Drop for Tty {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("failed to restore terminal settings: {}", e);
        }
    }
}
