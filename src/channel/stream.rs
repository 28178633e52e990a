//! Channel over a blocking `Read + Write` stream.

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use super::ByteChannel;
use crate::core::DEFAULT_TIMEOUT;

/// A [`ByteChannel`] over any blocking stream.
///
/// The stream is expected to bound each `read` call itself (a serial port
/// timeout, a socket read timeout). On top of that, `read_exactly` stops
/// once `timeout` has elapsed since it started, so a peer trickling single
/// bytes cannot hold a word open indefinitely.
#[derive(Debug)]
pub struct StreamChannel<S> {
    stream: S,
    timeout: Duration,
}

impl<S: Read + Write> StreamChannel<S> {
    /// Wrap a stream with the default timeout.
    pub fn new(stream: S) -> Self {
        Self::with_timeout(stream, DEFAULT_TIMEOUT)
    }

    /// Wrap a stream with a specific timeout.
    pub fn with_timeout(stream: S, timeout: Duration) -> Self {
        Self { stream, timeout }
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get a reference to the underlying stream.
    pub fn inner(&self) -> &S {
        &self.stream
    }
}

impl<S: Read + Write> ByteChannel for StreamChannel<S> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < bytes.len() {
            match self.stream.write(&bytes[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => break,
                Err(e) => return Err(e),
            }
        }
        if written == bytes.len() {
            self.stream.flush()?;
        }
        Ok(written)
    }

    fn read_exactly(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let deadline = Instant::now() + self.timeout;
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                // End of stream
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => break,
                Err(e) => return Err(e),
            }
            if filled < buf.len() && Instant::now() >= deadline {
                break;
            }
        }
        Ok(filled)
    }

    fn close(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}
