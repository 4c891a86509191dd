//! Silencing and buffering of a test's standard output.
//!
//! While a test runs quietly its stdout is pointed away from the console and
//! kept so that it can be replayed under a failure report. The runner turns
//! capture off around anything it prints itself.
//!
//! At most [`CAPTURE_LIMIT`] bytes are ever stored per test; anything a test
//! prints past that is read and thrown away.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use sys::Redirect;

/// Maximum number of bytes of stdout retained per test.
pub const CAPTURE_LIMIT: usize = 4096;

/// A switchable sink for the process's standard output.
pub trait OutputCapture {
    /// Starts diverting stdout. Enabling twice is a no-op.
    fn enable(&mut self) -> io::Result<()>;

    /// Restores the real stdout. Disabling while disabled is a no-op.
    fn disable(&mut self) -> io::Result<()>;

    /// Output gathered since the last clear, truncated to the buffer size.
    fn captured(&mut self) -> io::Result<String>;

    /// Discards everything gathered so far.
    fn clear(&mut self) -> io::Result<()>;
}

/// Leaves stdout alone. Used when output suppression is turned off.
#[derive(Debug, Default)]
pub struct Passthrough;

impl OutputCapture for Passthrough {
    fn enable(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn disable(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn captured(&mut self) -> io::Result<String> {
        Ok(String::new())
    }

    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// BOUNDED STORE
// ============================================================================

/// Fixed-capacity byte store. Bytes past the limit are counted, not kept.
#[derive(Debug)]
pub struct BoundedBuffer {
    bytes: Vec<u8>,
    limit: usize,
    dropped: usize,
}

impl BoundedBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(limit),
            limit,
            dropped: 0,
        }
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        let room = self.limit - self.bytes.len();
        let kept = room.min(chunk.len());
        self.bytes.extend_from_slice(&chunk[..kept]);
        self.dropped += chunk.len() - kept;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes discarded since the last clear.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.dropped = 0;
    }
}

type SharedStore = Arc<Mutex<BoundedBuffer>>;

fn lock(store: &SharedStore) -> std::sync::MutexGuard<'_, BoundedBuffer> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// STDOUT REDIRECTION
// ============================================================================

/// Redirects file descriptor 1 into a pipe drained into a [`BoundedBuffer`].
///
/// Redirecting the descriptor (rather than Rust's `Stdout` handle) also
/// catches output written by foreign code linked into the test binary.
#[derive(Debug)]
pub struct StdoutRedirect {
    store: SharedStore,
    active: Option<Redirect>,
}

impl StdoutRedirect {
    pub fn new() -> Self {
        Self::with_limit(CAPTURE_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(BoundedBuffer::new(limit))),
            active: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }

    /// Number of bytes currently held.
    pub fn stored(&self) -> usize {
        lock(&self.store).len()
    }

    /// Number of bytes thrown away since the last clear.
    pub fn dropped(&self) -> usize {
        lock(&self.store).dropped()
    }

    /// Waits until everything written so far has reached the store.
    ///
    /// The pipe reader only sees end-of-file once fd 1 is restored, so an
    /// enabled redirect is cycled off and on again.
    fn settle(&mut self) -> io::Result<bool> {
        let was_enabled = self.is_enabled();
        if was_enabled {
            self.disable()?;
        }
        Ok(was_enabled)
    }
}

impl Default for StdoutRedirect {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputCapture for StdoutRedirect {
    fn enable(&mut self) -> io::Result<()> {
        if self.active.is_some() {
            return Ok(());
        }
        io::stdout().flush()?;
        self.active = Some(sys::redirect(Arc::clone(&self.store))?);
        Ok(())
    }

    fn disable(&mut self) -> io::Result<()> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };
        io::stdout().flush()?;
        sys::restore(active)
    }

    fn captured(&mut self) -> io::Result<String> {
        let resume = self.settle()?;
        let text = String::from_utf8_lossy(lock(&self.store).as_bytes()).into_owned();
        if resume {
            self.enable()?;
        }
        Ok(text)
    }

    fn clear(&mut self) -> io::Result<()> {
        let resume = self.settle()?;
        lock(&self.store).clear();
        if resume {
            self.enable()?;
        }
        Ok(())
    }
}

impl Drop for StdoutRedirect {
    fn drop(&mut self) {
        if let Err(e) = self.disable() {
            warn!(error = %e, "failed to restore stdout");
        }
    }
}

/// Picks the capture used for a run.
pub fn for_run(suppress_output: bool) -> io::Result<Box<dyn OutputCapture>> {
    if suppress_output && sys::SUPPORTED {
        Ok(Box::new(StdoutRedirect::new()))
    } else {
        Ok(Box::new(Passthrough))
    }
}

#[cfg(unix)]
mod sys {
    use std::fs::File;
    use std::io::{self, Read};
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
    use std::thread::{self, JoinHandle};

    use super::{lock, SharedStore};

    pub const SUPPORTED: bool = true;

    /// An active redirection: the original stdout and the thread draining
    /// the pipe that replaced it.
    #[derive(Debug)]
    pub struct Redirect {
        saved: OwnedFd,
        reader: JoinHandle<()>,
    }

    fn check(ret: libc::c_int) -> io::Result<libc::c_int> {
        if ret < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(ret)
        }
    }

    fn set_cloexec(fd: RawFd) -> io::Result<()> {
        let flags = check(unsafe { libc::fcntl(fd, libc::F_GETFD) })?;
        check(unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) })?;
        Ok(())
    }

    fn pipe() -> io::Result<(OwnedFd, OwnedFd)> {
        let mut fds = [0 as libc::c_int; 2];
        check(unsafe { libc::pipe(fds.as_mut_ptr()) })?;
        let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
        set_cloexec(read.as_raw_fd())?;
        set_cloexec(write.as_raw_fd())?;
        Ok((read, write))
    }

    fn drain(mut pipe: File, store: SharedStore) {
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => lock(&store).extend(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    }

    pub fn redirect(store: SharedStore) -> io::Result<Redirect> {
        let (read, write) = pipe()?;
        let reader = thread::Builder::new()
            .name("trellis-capture".to_owned())
            .spawn(move || drain(File::from(read), store))?;

        let saved = check(unsafe { libc::dup(libc::STDOUT_FILENO) })?;
        let saved = unsafe { OwnedFd::from_raw_fd(saved) };
        check(unsafe { libc::dup2(write.as_raw_fd(), libc::STDOUT_FILENO) })?;
        // fd 1 is now the only write end; restoring it lets the reader finish.
        drop(write);
        Ok(Redirect { saved, reader })
    }

    pub fn restore(active: Redirect) -> io::Result<()> {
        check(unsafe { libc::dup2(active.saved.as_raw_fd(), libc::STDOUT_FILENO) })?;
        active
            .reader
            .join()
            .map_err(|_| io::Error::other("stdout capture reader panicked"))
    }
}

#[cfg(not(unix))]
mod sys {
    use std::io;

    use super::SharedStore;

    pub const SUPPORTED: bool = false;

    #[derive(Debug)]
    pub enum Redirect {}

    pub fn redirect(_store: SharedStore) -> io::Result<Redirect> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "stdout redirection is not supported on this platform",
        ))
    }

    pub fn restore(active: Redirect) -> io::Result<()> {
        match active {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_is_inert() {
        let mut capture = Passthrough;
        capture.enable().unwrap();
        capture.enable().unwrap();
        assert_eq!(capture.captured().unwrap(), "");
        capture.clear().unwrap();
        capture.disable().unwrap();
    }

    #[test]
    fn test_bounded_buffer_keeps_prefix() {
        let mut buffer = BoundedBuffer::new(4);
        buffer.extend(b"ab");
        buffer.extend(b"cdefgh");
        buffer.extend(b"ij");
        assert_eq!(buffer.as_bytes(), b"abcd");
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.dropped(), 6);

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.dropped(), 0);
        buffer.extend(b"xyz");
        assert_eq!(buffer.as_bytes(), b"xyz");
    }

    #[test]
    fn test_disable_without_enable_is_noop() {
        let mut capture = StdoutRedirect::new();
        assert!(!capture.is_enabled());
        capture.disable().unwrap();
        assert!(!capture.is_enabled());
        assert_eq!(capture.captured().unwrap(), "");
    }

    #[test]
    fn test_for_run_without_suppression_is_passthrough() {
        let mut capture = for_run(false).unwrap();
        assert_eq!(capture.captured().unwrap(), "");
    }
}
