//! Protocol engine error types.
//!
//! Errors carry the phase they happened in. Anything that fails in the
//! response phase leaves the request already delivered: the peer's state is
//! unknown and the channel's framing position is lost.

use std::io;

use thiserror::Error;

use crate::codec::{Command, FrameError};
use crate::core::ShapeError;

/// Which half of an exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Writing the request.
    Request,
    /// Reading the response.
    Response,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Request => f.write_str("request"),
            Phase::Response => f.write_str("response"),
        }
    }
}

/// Protocol engine errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Operands of inconsistent shape. Nothing was written.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(#[from] ShapeError),

    /// The channel could not be opened or configured.
    #[error("channel unavailable: {path}: {reason}")]
    ChannelUnavailable {
        /// Device path.
        path: String,
        /// Reason reported by the driver.
        reason: String,
    },

    /// The channel accepted fewer request bytes than queued.
    #[error("{command:?}: short write, {actual} of {expected} bytes accepted")]
    ShortWrite {
        /// Command being sent.
        command: Command,
        /// Frame length.
        expected: usize,
        /// Bytes accepted.
        actual: usize,
    },

    /// A response word did not arrive completely before the timeout.
    ///
    /// The channel is left mid-frame. Later exchanges on it are unsafe
    /// until the peer resets independently.
    #[error(
        "{command:?}: short read, {actual} of {expected} bytes after {words_received} complete words"
    )]
    ShortRead {
        /// Command whose response was being read.
        command: Command,
        /// Bytes in the word being read.
        expected: usize,
        /// Bytes of that word obtained.
        actual: usize,
        /// Words fully received before the short one.
        words_received: usize,
    },

    /// Response bytes did not decode.
    #[error("{command:?}: malformed response: {source}")]
    Frame {
        /// Command whose response was being decoded.
        command: Command,
        /// Decoding error.
        #[source]
        source: FrameError,
    },

    /// Any other channel failure.
    #[error("{command:?}: i/o error during {phase}: {source}")]
    Io {
        /// Command being exchanged.
        command: Command,
        /// Phase the failure happened in.
        phase: Phase,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Closing the channel failed.
    #[error("close failed: {0}")]
    Close(#[source] io::Error),
}

impl ProtocolError {
    /// The exchange phase this error belongs to, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            ProtocolError::ShortWrite { .. } => Some(Phase::Request),
            ProtocolError::ShortRead { .. } | ProtocolError::Frame { .. } => Some(Phase::Response),
            ProtocolError::Io { phase, .. } => Some(*phase),
            ProtocolError::ShapeMismatch(_)
            | ProtocolError::ChannelUnavailable { .. }
            | ProtocolError::Close(_) => None,
        }
    }

    /// Check if the channel is untouched and the engine can be used again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::ShapeMismatch(_))
    }

    /// Check if the channel has lost its framing position.
    ///
    /// Any failure after the first request byte went out qualifies: the
    /// peer may be waiting for the rest of a frame or holding unread reply
    /// bytes.
    pub fn leaves_channel_desynchronized(&self) -> bool {
        matches!(
            self,
            ProtocolError::ShortWrite { .. }
                | ProtocolError::ShortRead { .. }
                | ProtocolError::Frame { .. }
                | ProtocolError::Io { .. }
        )
    }

    /// Check if this error came from a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            ProtocolError::ShortRead { .. } => true,
            ProtocolError::Io { source, .. } => source.kind() == io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
