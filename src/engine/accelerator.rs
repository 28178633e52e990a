//! Blocking protocol engine.

use super::error::{Phase, ProtocolError, ProtocolResult};
use crate::channel::ByteChannel;
use crate::codec::{Command, Request, Response, split_rows};
use crate::core::WORD_SIZE;

/// Host-side driver for the vector/matrix accelerator.
///
/// Each operation is one half-duplex exchange: the whole request is written,
/// then exactly the response it implies is read. `&mut self` keeps exchanges
/// from overlapping; wrap the engine in a `Mutex` to share it.
///
/// The engine owns its channel and releases it on [`close`](Self::close) or
/// drop. An engine built over `&mut channel` still closes that channel when
/// dropped.
///
/// # Known limitation
///
/// Responses carry no length, checksum or markers. After a
/// [`ShortRead`](ProtocolError::ShortRead) the channel sits at an unknown
/// position inside the peer's reply, and further exchanges will misparse
/// until the peer is reset.
#[derive(Debug)]
pub struct Accelerator<C: ByteChannel> {
    channel: C,
    closed: bool,
}

impl<C: ByteChannel> Accelerator<C> {
    /// Take ownership of an open channel.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            closed: false,
        }
    }

    /// Element-wise `v1 + v2`, computed by the accelerator.
    pub fn vector_add(&mut self, v1: &[u32], v2: &[u32]) -> ProtocolResult<Vec<u32>> {
        let request = Request::vector_add(v1, v2)?;
        self.exchange(&request)
    }

    /// Element-wise `v1 * v2`, computed by the accelerator.
    pub fn vector_multiply(&mut self, v1: &[u32], v2: &[u32]) -> ProtocolResult<Vec<u32>> {
        let request = Request::vector_multiply(v1, v2)?;
        self.exchange(&request)
    }

    /// Dot product `v1 . v2`, computed by the accelerator.
    pub fn vector_dot(&mut self, v1: &[u32], v2: &[u32]) -> ProtocolResult<u32> {
        let request = Request::vector_dot(v1, v2)?;
        let words = self.exchange(&request)?;
        Ok(words[0])
    }

    /// Matrix sum `m1 + m2`, computed by the accelerator.
    ///
    /// Rows and columns are taken from `m1`; `m2` must match and neither
    /// may have ragged rows.
    pub fn matrix_add<R: AsRef<[u32]>>(
        &mut self,
        m1: &[R],
        m2: &[R],
    ) -> ProtocolResult<Vec<Vec<u32>>> {
        let request = Request::matrix_add(m1, m2)?;
        let shape = request.shape();
        let words = self.exchange(&request)?;
        split_rows(words, shape.rows(), shape.cols()).map_err(|source| ProtocolError::Frame {
            command: Command::MatrixAdd,
            source,
        })
    }

    /// Run a prebuilt request and decode its response.
    pub fn execute(&mut self, request: &Request) -> ProtocolResult<Response> {
        let words = self.exchange(request)?;
        request
            .decode_response(words)
            .map_err(|source| ProtocolError::Frame {
                command: request.command(),
                source,
            })
    }

    /// Release the channel.
    pub fn close(mut self) -> ProtocolResult<()> {
        self.closed = true;
        self.channel.close().map_err(ProtocolError::Close)
    }

    fn exchange(&mut self, request: &Request) -> ProtocolResult<Vec<u32>> {
        let command = request.command();
        let frame = request.to_bytes();
        tracing::debug!(
            ?command,
            shape = ?request.shape(),
            bytes = frame.len(),
            "sending request"
        );

        self.send(command, &frame)?;

        match self.receive(command, request.response_words()) {
            Ok(words) => {
                tracing::debug!(?command, words = words.len(), "response received");
                Ok(words)
            }
            Err(e) => {
                tracing::warn!(?command, "exchange failed after request was sent: {}", e);
                Err(e)
            }
        }
    }

    fn send(&mut self, command: Command, frame: &[u8]) -> ProtocolResult<()> {
        let written = self
            .channel
            .write(frame)
            .map_err(|source| ProtocolError::Io {
                command,
                phase: Phase::Request,
                source,
            })?;
        if written != frame.len() {
            return Err(ProtocolError::ShortWrite {
                command,
                expected: frame.len(),
                actual: written,
            });
        }
        Ok(())
    }

    fn receive(&mut self, command: Command, count: usize) -> ProtocolResult<Vec<u32>> {
        let mut words = Vec::with_capacity(count);
        for words_received in 0..count {
            let mut word = [0u8; WORD_SIZE];
            let actual =
                self.channel
                    .read_exactly(&mut word)
                    .map_err(|source| ProtocolError::Io {
                        command,
                        phase: Phase::Response,
                        source,
                    })?;
            if actual < WORD_SIZE {
                return Err(ProtocolError::ShortRead {
                    command,
                    expected: WORD_SIZE,
                    actual,
                    words_received,
                });
            }
            words.push(u32::from_le_bytes(word));
        }
        Ok(words)
    }
}

impl<C: ByteChannel> Drop for Accelerator<C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.channel.close() {
            tracing::warn!("failed to close channel on drop: {}", e);
        }
    }
}

#[cfg(feature = "serial")]
impl Accelerator<crate::channel::SerialChannel> {
    /// Open a serial port and take ownership of it.
    pub fn open(config: &crate::channel::SerialConfig) -> ProtocolResult<Self> {
        Ok(Self::new(config.open()?))
    }
}
