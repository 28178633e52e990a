//! Async protocol engine over tokio streams.
//!
//! Same frames, same turn-taking, same error taxonomy as
//! [`Accelerator`](super::Accelerator). The per-word timeout is enforced with
//! `tokio::time` instead of the channel.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout_at};

use super::error::{Phase, ProtocolError, ProtocolResult};
use crate::codec::{Command, Request, Response, split_rows};
use crate::core::{DEFAULT_TIMEOUT, WORD_SIZE};

/// Async host-side driver for the accelerator.
///
/// Works over any `AsyncRead + AsyncWrite` stream: a serial port adapter, a
/// TCP bridge to the board, or `tokio::io::duplex` in tests.
#[derive(Debug)]
pub struct AsyncAccelerator<T> {
    stream: T,
    timeout: Duration,
}

impl<T: AsyncRead + AsyncWrite + Unpin> AsyncAccelerator<T> {
    /// Take ownership of a stream with the default timeout.
    pub fn new(stream: T) -> Self {
        Self::with_timeout(stream, DEFAULT_TIMEOUT)
    }

    /// Take ownership of a stream with a specific per-word timeout.
    pub fn with_timeout(stream: T, timeout: Duration) -> Self {
        Self { stream, timeout }
    }

    /// Configured per-word timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Element-wise `v1 + v2`.
    pub async fn vector_add(&mut self, v1: &[u32], v2: &[u32]) -> ProtocolResult<Vec<u32>> {
        let request = Request::vector_add(v1, v2)?;
        self.exchange(&request).await
    }

    /// Element-wise `v1 * v2`.
    pub async fn vector_multiply(&mut self, v1: &[u32], v2: &[u32]) -> ProtocolResult<Vec<u32>> {
        let request = Request::vector_multiply(v1, v2)?;
        self.exchange(&request).await
    }

    /// Dot product `v1 . v2`.
    pub async fn vector_dot(&mut self, v1: &[u32], v2: &[u32]) -> ProtocolResult<u32> {
        let request = Request::vector_dot(v1, v2)?;
        let words = self.exchange(&request).await?;
        Ok(words[0])
    }

    /// Matrix sum `m1 + m2`.
    pub async fn matrix_add<R: AsRef<[u32]>>(
        &mut self,
        m1: &[R],
        m2: &[R],
    ) -> ProtocolResult<Vec<Vec<u32>>> {
        let request = Request::matrix_add(m1, m2)?;
        let shape = request.shape();
        let words = self.exchange(&request).await?;
        split_rows(words, shape.rows(), shape.cols()).map_err(|source| ProtocolError::Frame {
            command: Command::MatrixAdd,
            source,
        })
    }

    /// Run a prebuilt request and decode its response.
    pub async fn execute(&mut self, request: &Request) -> ProtocolResult<Response> {
        let words = self.exchange(request).await?;
        request
            .decode_response(words)
            .map_err(|source| ProtocolError::Frame {
                command: request.command(),
                source,
            })
    }

    /// Shut down the write half and release the stream.
    pub async fn shutdown(mut self) -> ProtocolResult<()> {
        self.stream.shutdown().await.map_err(ProtocolError::Close)
    }

    async fn exchange(&mut self, request: &Request) -> ProtocolResult<Vec<u32>> {
        let command = request.command();
        let frame = request.to_bytes();
        tracing::debug!(
            ?command,
            shape = ?request.shape(),
            bytes = frame.len(),
            "sending request"
        );

        self.send(command, &frame).await?;

        match self.receive(command, request.response_words()).await {
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

    async fn send(&mut self, command: Command, frame: &[u8]) -> ProtocolResult<()> {
        let io_err = |source: io::Error| ProtocolError::Io {
            command,
            phase: Phase::Request,
            source,
        };

        let mut written = 0;
        while written < frame.len() {
            match self.stream.write(&frame[written..]).await {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_err(e)),
            }
        }
        self.stream.flush().await.map_err(io_err)?;

        if written != frame.len() {
            return Err(ProtocolError::ShortWrite {
                command,
                expected: frame.len(),
                actual: written,
            });
        }
        Ok(())
    }

    async fn receive(&mut self, command: Command, count: usize) -> ProtocolResult<Vec<u32>> {
        let mut words = Vec::with_capacity(count);
        for words_received in 0..count {
            let mut word = [0u8; WORD_SIZE];
            let actual = self.read_word(command, &mut word).await?;
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

    /// Fill `word` or stop at the deadline / end of stream.
    async fn read_word(&mut self, command: Command, word: &mut [u8]) -> ProtocolResult<usize> {
        let deadline = Instant::now() + self.timeout;
        let mut filled = 0;
        while filled < word.len() {
            match timeout_at(deadline, self.stream.read(&mut word[filled..])).await {
                // Timed out
                Err(_) => break,
                // End of stream
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => filled += n,
                Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Ok(Err(source)) => {
                    return Err(ProtocolError::Io {
                        command,
                        phase: Phase::Response,
                        source,
                    });
                }
            }
        }
        Ok(filled)
    }
}
