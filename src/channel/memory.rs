//! In-memory channel for tests and dry runs.

use std::collections::VecDeque;
use std::io;

use super::ByteChannel;

/// A scripted [`ByteChannel`] that never touches hardware.
///
/// Writes are recorded. Reads are served from a reply buffer loaded with
/// [`push_reply`](Self::push_reply); once it runs dry, reads come up short
/// exactly as a timed-out port would.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    written: Vec<u8>,
    write_calls: usize,
    reply: VecDeque<u8>,
    /// Largest chunk served by one underlying read (0 = unlimited).
    chunk_size: usize,
    /// Total bytes accepted before writes start coming up short.
    accept_limit: Option<usize>,
    reads: usize,
    closed: bool,
}

impl MemoryChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel with `reply` already queued.
    pub fn with_reply(reply: &[u8]) -> Self {
        let mut channel = Self::new();
        channel.push_reply(reply);
        channel
    }

    /// Queue bytes for the engine to read.
    pub fn push_reply(&mut self, bytes: &[u8]) {
        self.reply.extend(bytes);
    }

    /// Deliver replies at most `size` bytes at a time.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size;
    }

    /// Accept at most `limit` bytes in total.
    pub fn set_accept_limit(&mut self, limit: usize) {
        self.accept_limit = Some(limit);
    }

    /// Every byte written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of `write` calls made.
    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    /// Number of underlying chunk reads served.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Reply bytes not yet consumed.
    pub fn pending_reply(&self) -> usize {
        self.reply.len()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ByteChannel for MemoryChannel {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "channel closed"));
        }
        self.write_calls += 1;
        let accepted = match self.accept_limit {
            Some(limit) => bytes.len().min(limit.saturating_sub(self.written.len())),
            None => bytes.len(),
        };
        self.written.extend_from_slice(&bytes[..accepted]);
        Ok(accepted)
    }

    fn read_exactly(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "channel closed"));
        }
        let mut filled = 0;
        while filled < buf.len() && !self.reply.is_empty() {
            let want = match self.chunk_size {
                0 => buf.len() - filled,
                size => size.min(buf.len() - filled),
            };
            let n = want.min(self.reply.len());
            for (slot, byte) in buf[filled..filled + n].iter_mut().zip(self.reply.drain(..n)) {
                *slot = byte;
            }
            filled += n;
            self.reads += 1;
        }
        Ok(filled)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_writes() {
        let mut channel = MemoryChannel::new();
        assert_eq!(channel.write(&[1, 2]).unwrap(), 2);
        assert_eq!(channel.write(&[3]).unwrap(), 1);
        assert_eq!(channel.written(), &[1, 2, 3]);
        assert_eq!(channel.write_calls(), 2);
    }

    #[test]
    fn test_chunked_reply() {
        let mut channel = MemoryChannel::with_reply(&[1, 2, 3, 4, 5]);
        channel.set_chunk_size(1);
        let mut buf = [0u8; 4];
        assert_eq!(channel.read_exactly(&mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(channel.reads(), 4);
        assert_eq!(channel.pending_reply(), 1);
    }

    #[test]
    fn test_short_reply() {
        let mut channel = MemoryChannel::with_reply(&[1, 2, 3]);
        let mut buf = [0u8; 4];
        assert_eq!(channel.read_exactly(&mut buf).unwrap(), 3);
        assert_eq!(channel.read_exactly(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_accept_limit() {
        let mut channel = MemoryChannel::new();
        channel.set_accept_limit(3);
        assert_eq!(channel.write(&[1, 2]).unwrap(), 2);
        assert_eq!(channel.write(&[3, 4]).unwrap(), 1);
        assert_eq!(channel.write(&[5]).unwrap(), 0);
    }

    #[test]
    fn test_closed_channel_rejects_io() {
        let mut channel = MemoryChannel::new();
        channel.close().unwrap();
        assert!(channel.is_closed());
        assert_eq!(
            channel.write(&[1]).unwrap_err().kind(),
            io::ErrorKind::NotConnected
        );
    }
}
