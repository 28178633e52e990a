//! Byte channels the protocol engine runs over.
//!
//! A channel is a duplex, timeout-capable byte stream. The engine owns its
//! channel exclusively and never hands it out.
//!
//! - [`StreamChannel`]: any blocking `Read + Write` stream with a per-read
//!   deadline
//! - [`SerialChannel`]: a serial port (requires `serial` feature)
//! - [`MemoryChannel`]: scripted in-memory channel for tests

mod memory;
#[cfg(feature = "serial")]
mod serial;
mod stream;

use std::io;

pub use memory::MemoryChannel;
#[cfg(feature = "serial")]
pub use serial::{SerialChannel, SerialConfig};
pub use stream::StreamChannel;

/// A duplex byte stream with a fixed read timeout.
pub trait ByteChannel {
    /// Write `bytes`, returning how many the channel accepted.
    ///
    /// Returning fewer than `bytes.len()` is a short write; the engine
    /// aborts the exchange without reading.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Fill `buf`, looping over partial reads until it is full or the
    /// channel's timeout elapses.
    ///
    /// Returns the number of bytes obtained. Anything less than
    /// `buf.len()` means the timeout fired or the stream ended.
    fn read_exactly(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the channel.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for &mut C {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    fn read_exactly(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_exactly(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for Box<C> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    fn read_exactly(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_exactly(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
