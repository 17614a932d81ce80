//! The key decoder session
//!
//! [`TermKey`] ties an input buffer and a [`Recognizer`] to an optional
//! terminal device. Bytes come from the device or from
//! [`TermKey::push_bytes`]; keys come out of [`TermKey::getkey`],
//! [`TermKey::getkey_force`] and [`TermKey::waitkey`].
//!
//! The wait time decides how long an ambiguous prefix such as a lone ESC
//! is given to grow into a longer sequence before it is taken literally.

use std::cell::Cell;
use std::cmp::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use termkey_parser::{
    format_key, parse_key, CanonFlags, Flags, FormatFlags, Key, Peek, Recognizer,
};
use termkey_tty::{RawMode, Tty};
use tracing::{debug, warn};

use crate::buffer::InputBuffer;
use crate::config::Config;
use crate::error::{Error, ErrorCode, Result};

/// Attachment state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Never started
    Detached,
    /// Raw mode applied (when there is a device and termios is in use)
    Started,
    /// Stopped after having been started
    Stopped,
}

/// Outcome of a decode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    /// Nothing buffered
    None,
    /// A decoded key
    Key(Key),
    /// Input has ended and the buffer is drained
    Eof,
    /// An incomplete sequence is buffered; call again later
    Again,
}

/// Flat result code for callers that do not match on [`KeyResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    None,
    Key,
    Eof,
    Again,
    Error,
}

impl KeyResult {
    pub fn code(&self) -> ResultCode {
        match self {
            KeyResult::None => ResultCode::None,
            KeyResult::Key(_) => ResultCode::Key,
            KeyResult::Eof => ResultCode::Eof,
            KeyResult::Again => ResultCode::Again,
        }
    }

    /// The key, if one was decoded
    pub fn key(self) -> Option<Key> {
        match self {
            KeyResult::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl ResultCode {
    /// Result code of a fallible decode call
    pub fn of(result: &Result<KeyResult>) -> Self {
        result.as_ref().map_or(ResultCode::Error, KeyResult::code)
    }
}

/// How a wait on the device ended
enum Readiness {
    Ready,
    TimedOut,
    Interrupted,
    /// Interrupted, but EINTR is set; wait again
    Retry,
}

/// A key decoder session
pub struct TermKey {
    recognizer: Recognizer,
    buffer: InputBuffer,
    wait_time: Duration,
    /// Terminal to read from; `None` for push-only sessions
    device: Option<Tty>,
    status: Lifecycle,
    /// The device reported end of input
    closed: bool,
    /// When the current incomplete prefix was first seen
    pending_since: Option<Instant>,
    last_error: Cell<Option<ErrorCode>>,
}

impl TermKey {
    /// Attach to standard input
    pub fn new(flags: Flags) -> Result<Self> {
        let tty = Tty::stdin()?;
        Self::with_tty(tty, flags)
    }

    /// Attach to a terminal device
    ///
    /// Starts immediately unless `flags` contains NOSTART.
    pub fn with_tty(tty: Tty, flags: Flags) -> Result<Self> {
        let mut tk = Self::detached(Some(tty), flags, locale_env);
        if !flags.contains(Flags::NOSTART) {
            tk.start()?;
        }
        Ok(tk)
    }

    /// A session without a device, fed only through [`TermKey::push_bytes`]
    pub fn new_abstract(flags: Flags) -> Self {
        let mut tk = Self::detached(None, flags, locale_env);
        if !flags.contains(Flags::NOSTART) {
            tk.status = Lifecycle::Started;
        }
        tk
    }

    fn detached(device: Option<Tty>, flags: Flags, env: impl Fn(&str) -> Option<String>) -> Self {
        let flags = resolve_encoding(flags, env);
        let config = Config::default();
        Self {
            recognizer: Recognizer::new(flags, config.canon_flags),
            buffer: InputBuffer::new(config.buffer_size),
            wait_time: Duration::from_millis(config.wait_time_ms),
            device,
            status: Lifecycle::Detached,
            closed: false,
            pending_since: None,
            last_error: Cell::new(None),
        }
    }

    // Lifecycle

    /// Enter raw mode on the device
    ///
    /// Does nothing when already started, without a device, or with NOTERMIOS.
    pub fn start(&mut self) -> Result<()> {
        if self.status == Lifecycle::Started {
            return Ok(());
        }

        let flags = self.recognizer.flags();
        if let Some(tty) = self.device.as_mut() {
            if !flags.contains(Flags::NOTERMIOS) {
                let mode = RawMode {
                    ctrlc: flags.contains(Flags::CTRLC),
                };
                let applied = tty.enter_raw_mode(mode).map_err(Error::from);
                let applied = self.record(applied)?;
                debug!(raw = applied, ctrlc = mode.ctrlc, "started");
            }
        }

        self.status = Lifecycle::Started;
        Ok(())
    }

    /// Restore the device's original settings
    pub fn stop(&mut self) -> Result<()> {
        if self.status != Lifecycle::Started {
            return Ok(());
        }

        if let Some(tty) = self.device.as_mut() {
            let restored = tty.restore().map_err(Error::from);
            self.record(restored)?;
        }

        self.status = Lifecycle::Stopped;
        debug!("stopped");
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.status == Lifecycle::Started
    }

    pub fn status(&self) -> Lifecycle {
        self.status
    }

    /// The attached device, if any
    pub fn device(&self) -> Option<&Tty> {
        self.device.as_ref()
    }

    // Configuration

    pub fn flags(&self) -> Flags {
        self.recognizer.flags()
    }

    /// Set decoder flags
    ///
    /// Takes effect on the next decode. NOTERMIOS and CTRLC are applied to
    /// the device on the next [`TermKey::start`].
    pub fn set_flags(&mut self, flags: Flags) {
        let changed = self.recognizer.flags() ^ flags;
        self.recognizer.set_flags(flags);
        if self.is_started() && changed.intersects(Flags::TERMIOS_AFFECTING) {
            debug!(?flags, "raw mode flags changed; restart to apply");
        }
    }

    pub fn canon_flags(&self) -> CanonFlags {
        self.recognizer.canon_flags()
    }

    pub fn set_canon_flags(&mut self, canon_flags: CanonFlags) {
        self.recognizer.set_canon_flags(canon_flags);
    }

    pub fn wait_time_ms(&self) -> u64 {
        self.wait_time.as_millis() as u64
    }

    pub fn set_wait_time_ms(&mut self, ms: u64) {
        self.wait_time = Duration::from_millis(ms);
    }

    /// Buffer capacity in bytes
    pub fn buffer_size(&self) -> usize {
        self.buffer.capacity()
    }

    /// Change the buffer capacity; fails if unconsumed bytes would not fit
    pub fn set_buffer_size(&mut self, size: usize) -> Result<()> {
        let result = self.buffer.set_capacity(size);
        self.record(result)
    }

    /// Free space in the buffer
    pub fn buffer_remaining(&self) -> usize {
        self.buffer.remaining()
    }

    /// Unconsumed bytes in the buffer
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> Config {
        Config {
            flags: self.flags(),
            canon_flags: self.canon_flags(),
            wait_time_ms: self.wait_time_ms(),
            buffer_size: self.buffer_size(),
        }
    }

    /// Apply a configuration snapshot
    ///
    /// Flags naming neither RAW nor UTF8 get the encoding from the locale,
    /// as at construction.
    pub fn configure(&mut self, config: &Config) -> Result<()> {
        self.apply_config(config, locale_env)
    }

    fn apply_config(&mut self, config: &Config, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        self.set_buffer_size(config.buffer_size)?;
        self.set_flags(resolve_encoding(config.flags, env));
        self.set_canon_flags(config.canon_flags);
        self.set_wait_time_ms(config.wait_time_ms);
        debug!(?config, "configured");
        Ok(())
    }

    /// Most recent error recorded by a fallible call
    pub fn last_error(&self) -> Option<ErrorCode> {
        self.last_error.get()
    }

    pub fn set_last_error(&self, code: Option<ErrorCode>) {
        self.last_error.set(code);
    }

    // Input

    /// Append bytes to the buffer
    ///
    /// On overflow the bytes that fit are kept; the error says how many.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let result = self.buffer.push(bytes);
        if let Err(Error::BufferOverflow {
            accepted,
            requested,
        }) = &result
        {
            warn!(accepted, requested, "input buffer overflow");
        }
        self.record(result)
    }

    /// Read whatever the device has ready without blocking
    ///
    /// Returns `Again` when bytes were added, `None` otherwise. Never decodes.
    pub fn advisereadable(&mut self) -> Result<KeyResult> {
        if self.device.is_none() {
            return Ok(KeyResult::None);
        }
        let result = self.advise();
        self.record(result)
    }

    fn advise(&mut self) -> Result<KeyResult> {
        match self.poll_device(Some(Duration::ZERO))? {
            Readiness::Ready => match self.fill_from_device()? {
                0 => Ok(KeyResult::None),
                _ => Ok(KeyResult::Again),
            },
            Readiness::Interrupted => Err(Error::Interrupted),
            Readiness::TimedOut | Readiness::Retry => Ok(KeyResult::None),
        }
    }

    // Decoding

    /// Decode the next key without waiting
    ///
    /// An incomplete sequence yields `Again`.
    pub fn getkey(&mut self) -> KeyResult {
        self.decode(false)
    }

    /// Decode the next key, taking any incomplete sequence literally
    pub fn getkey_force(&mut self) -> KeyResult {
        self.decode(true)
    }

    /// Decode the next key, waiting for input as needed
    ///
    /// An incomplete sequence is given the wait time, counted from when it
    /// first appeared, to complete before it is forced. With a device, an
    /// empty buffer blocks until input arrives; without one it returns
    /// `None`.
    pub fn waitkey(&mut self) -> Result<KeyResult> {
        let result = self.wait();
        self.record(result)
    }

    fn wait(&mut self) -> Result<KeyResult> {
        loop {
            match self.getkey() {
                KeyResult::None if self.device.is_none() => return Ok(KeyResult::None),
                KeyResult::None => match self.poll_device(None)? {
                    Readiness::Ready => {
                        self.fill_from_device()?;
                    }
                    Readiness::TimedOut | Readiness::Retry => {}
                    Readiness::Interrupted => return Err(Error::Interrupted),
                },
                KeyResult::Again if self.closed => return Ok(self.getkey_force()),
                KeyResult::Again => {
                    let since = self.pending_since.unwrap_or_else(Instant::now);
                    let remaining = (since + self.wait_time).saturating_duration_since(Instant::now());

                    if remaining.is_zero() {
                        return Ok(self.getkey_force());
                    }
                    if self.device.is_none() {
                        thread::sleep(remaining);
                        return Ok(self.getkey_force());
                    }

                    match self.poll_device(Some(remaining))? {
                        Readiness::Ready => {
                            self.fill_from_device()?;
                        }
                        Readiness::TimedOut => return Ok(self.getkey_force()),
                        Readiness::Retry => {}
                        Readiness::Interrupted => return Err(Error::Interrupted),
                    }
                }
                done => return Ok(done),
            }
        }
    }

    fn decode(&mut self, force: bool) -> KeyResult {
        match self.recognizer.peek(self.buffer.as_slice(), force) {
            Peek::Key { key, consumed } => {
                self.buffer.consume(consumed);
                self.pending_since = None;
                KeyResult::Key(key)
            }
            Peek::Again => {
                self.pending_since.get_or_insert_with(Instant::now);
                KeyResult::Again
            }
            Peek::Empty if self.closed => {
                self.pending_since = None;
                self.last_error.set(Some(ErrorCode::StreamEnd));
                KeyResult::Eof
            }
            Peek::Empty => {
                self.pending_since = None;
                KeyResult::None
            }
        }
    }

    /// Wait for device input; EINTR is retried when the EINTR flag is set
    fn poll_device(&self, timeout: Option<Duration>) -> Result<Readiness> {
        let Some(tty) = self.device.as_ref() else {
            return Ok(Readiness::TimedOut);
        };

        match tty.poll_readable(timeout) {
            Ok(true) => Ok(Readiness::Ready),
            Ok(false) => Ok(Readiness::TimedOut),
            Err(e) => self.interruption(e),
        }
    }

    /// Sort a device error: EINTR is `Retry` under the EINTR flag and
    /// `Interrupted` otherwise; anything else is returned as an error
    fn interruption(&self, e: termkey_tty::Error) -> Result<Readiness> {
        match e {
            termkey_tty::Error::Interrupted if self.flags().contains(Flags::EINTR) => {
                debug!("interrupted by a signal; retrying");
                Ok(Readiness::Retry)
            }
            termkey_tty::Error::Interrupted => Ok(Readiness::Interrupted),
            e => Err(e.into()),
        }
    }

    /// Read from the device into free buffer space; a zero-byte read marks end of input
    ///
    /// A read interrupted under the EINTR flag adds nothing and is not an error.
    fn fill_from_device(&mut self) -> Result<usize> {
        let Some(tty) = self.device.as_mut() else {
            return Ok(0);
        };
        if self.buffer.remaining() == 0 {
            return Err(Error::BufferOverflow {
                accepted: 0,
                requested: 1,
            });
        }

        match self.buffer.fill_from(|spare| tty.read(spare)) {
            Ok(0) => {
                debug!("end of input");
                self.closed = true;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => match self.interruption(e)? {
                Readiness::Retry => Ok(0),
                _ => Err(Error::Interrupted),
            },
        }
    }

    // Keys

    /// Apply the canonicalisation flags to `key`
    pub fn canonicalise(&self, key: &mut Key) {
        self.recognizer.canonicalise(key);
    }

    /// Compare two keys after canonicalising both
    pub fn keycmp(&self, a: &Key, b: &Key) -> Ordering {
        let mut a = a.clone();
        let mut b = b.clone();
        self.canonicalise(&mut a);
        self.canonicalise(&mut b);
        a.cmp(&b)
    }

    /// Render a key as text
    pub fn strfkey(&self, key: &Key, format: FormatFlags) -> Result<String> {
        self.record(format_key(key, format).map_err(Error::from))
    }

    /// Parse a key written by [`TermKey::strfkey`]; returns the key and unparsed text
    pub fn strpkey<'a>(&self, text: &'a str, format: FormatFlags) -> Option<(Key, &'a str)> {
        parse_key(text, format, self.canon_flags())
    }

    /// Keep the code of a failed result as the last error
    fn record<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.last_error.set(Some(e.code()));
        }
        result
    }
}

impl Drop for TermKey {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("failed to stop: {}", e);
        }
    }
}

fn locale_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Enable UTF-8 from the locale when neither RAW nor UTF8 was requested
///
/// The first of `LANG`, `LC_MESSAGES` and `LC_ALL` that is set decides.
fn resolve_encoding(flags: Flags, env: impl Fn(&str) -> Option<String>) -> Flags {
    if flags.intersects(Flags::RAW | Flags::UTF8) {
        return flags;
    }

    let locale = ["LANG", "LC_MESSAGES", "LC_ALL"]
        .into_iter()
        .find_map(|name| env(name));
    let utf8 = locale
        .as_deref()
        .and_then(|locale| locale.split_once('.'))
        .map(|(_, codeset)| codeset.split('@').next().unwrap_or(codeset))
        .is_some_and(|codeset| {
            codeset.eq_ignore_ascii_case("UTF-8") || codeset.eq_ignore_ascii_case("UTF8")
        });

    if utf8 {
        flags | Flags::UTF8
    } else {
        flags
    }
}
