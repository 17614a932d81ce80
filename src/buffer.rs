//! Input byte buffer
//!
//! Bytes are appended at the back and consumed from the front as keys are
//! recognized. Capacity is a hard limit: data that does not fit is
//! reported, never dropped silently.

use crate::error::{Error, Result};

/// Default capacity in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Front-consumed byte queue with a fixed capacity
#[derive(Debug, Clone)]
pub struct InputBuffer {
    /// Buffered bytes; `data[start..]` is unconsumed
    data: Vec<u8>,
    /// Offset of the first unconsumed byte
    start: usize,
    /// Maximum number of unconsumed bytes
    capacity: usize,
}

impl InputBuffer {
    /// Create an empty buffer
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            start: 0,
            capacity,
        }
    }

    /// Unconsumed bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..]
    }

    /// Number of unconsumed bytes
    pub fn len(&self) -> usize {
        self.data.len() - self.start
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free space
    pub fn remaining(&self) -> usize {
        self.capacity - self.len()
    }

    /// Append as much of `bytes` as fits
    ///
    /// On overflow the bytes that fit are kept and the error reports how
    /// many that was.
    pub fn push(&mut self, bytes: &[u8]) -> Result<usize> {
        self.compact();
        let accepted = bytes.len().min(self.remaining());
        self.data.extend_from_slice(&bytes[..accepted]);

        if accepted < bytes.len() {
            return Err(Error::BufferOverflow {
                accepted,
                requested: bytes.len(),
            });
        }
        Ok(accepted)
    }

    /// Drop `n` bytes from the front
    pub fn consume(&mut self, n: usize) {
        self.start = (self.start + n).min(self.data.len());
        if self.start == self.data.len() {
            self.data.clear();
            self.start = 0;
        }
    }

    /// Change the capacity
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity < self.len() {
            return Err(Error::BufferInUse {
                requested: capacity,
                buffered: self.len(),
            });
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Let `read` fill the free space and keep what it reports reading
    pub fn fill_from<E>(
        &mut self,
        read: impl FnOnce(&mut [u8]) -> std::result::Result<usize, E>,
    ) -> std::result::Result<usize, E> {
        self.compact();
        let len = self.data.len();
        self.data.resize(self.capacity, 0);
        let result = read(&mut self.data[len..]);
        let n = result.as_ref().map_or(0, |&n| n.min(self.capacity - len));
        self.data.truncate(len + n);
        result.map(|_| n)
    }

    /// Move unconsumed bytes to the front
    fn compact(&mut self) {
        if self.start > 0 {
            self.data.drain(..self.start);
            self.start = 0;
        }
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}
