//! Request and response frames.
//!
//! Request wire format, vector commands (0x01-0x03):
//! ```text
//! +--------+-----------+-------------------+-------------------+
//! | Opcode | N         | V1                | V2                |
//! | 1 byte | 4 (LE32)  | N x 4 (LE32 each) | N x 4 (LE32 each) |
//! +--------+-----------+-------------------+-------------------+
//! ```
//!
//! Request wire format, matrix add (0x04):
//! ```text
//! +--------+-----------+-----------+----------------+----------------+
//! | Opcode | Rows      | Cols      | M1 row-major   | M2 row-major   |
//! | 1 byte | 4 (LE32)  | 4 (LE32)  | R x C x 4      | R x C x 4      |
//! +--------+-----------+-----------+----------------+----------------+
//! ```
//!
//! Responses carry no header: `N` words for add/multiply, one word for the
//! dot product, `Rows x Cols` words for matrix add. The receiver derives the
//! length from the request it sent.

use thiserror::Error;

use super::word::{decode_word, decode_words, put_words};
use crate::core::{
    MATRIX_HEADER_SIZE, OP_MATRIX_ADD, OP_VECTOR_ADD, OP_VECTOR_DOT, OP_VECTOR_MULTIPLY, Shape,
    ShapeError, VECTOR_HEADER_SIZE, WORD_SIZE,
};

/// Accelerator opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Element-wise `v1 + v2`.
    VectorAdd = OP_VECTOR_ADD,
    /// Element-wise `v1 * v2`.
    VectorMultiply = OP_VECTOR_MULTIPLY,
    /// `v1 . v2`.
    VectorDotProduct = OP_VECTOR_DOT,
    /// `m1 + m2`.
    MatrixAdd = OP_MATRIX_ADD,
}

impl Command {
    /// Parse a command from its opcode byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            OP_VECTOR_ADD => Some(Self::VectorAdd),
            OP_VECTOR_MULTIPLY => Some(Self::VectorMultiply),
            OP_VECTOR_DOT => Some(Self::VectorDotProduct),
            OP_MATRIX_ADD => Some(Self::MatrixAdd),
            _ => None,
        }
    }

    /// Opcode byte.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Whether the command carries matrix operands.
    pub fn is_matrix(self) -> bool {
        matches!(self, Self::MatrixAdd)
    }

    /// Header size (opcode plus size fields).
    pub fn header_size(self) -> usize {
        if self.is_matrix() {
            MATRIX_HEADER_SIZE
        } else {
            VECTOR_HEADER_SIZE
        }
    }
}

/// Errors that can occur while decoding frames.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Frame is too short.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum expected size.
        expected: usize,
        /// Actual size received.
        actual: usize,
    },

    /// Unknown opcode.
    #[error("invalid command: 0x{0:02x}")]
    InvalidCommand(u8),

    /// Bytes left after a complete frame.
    #[error("trailing bytes: frame is {expected} bytes, got {actual}")]
    TrailingBytes {
        /// Exact frame size implied by the header.
        expected: usize,
        /// Actual size received.
        actual: usize,
    },

    /// Buffer length is not a whole number of words.
    #[error("{trailing} bytes left over after the last whole word")]
    PartialWord {
        /// Bytes past the last complete word.
        trailing: usize,
    },

    /// Response holds a different number of words than the request implies.
    #[error("response word count mismatch: expected {expected}, got {actual}")]
    WordCountMismatch {
        /// Words implied by the request.
        expected: usize,
        /// Words received.
        actual: usize,
    },

    /// Decoded result would not fit in memory.
    #[error("response of {rows} rows cannot be allocated")]
    TooLarge {
        /// Row count from the request header.
        rows: u32,
    },
}

/// An encoded-on-demand request frame.
///
/// Operands are copied in at construction, so the frame owns everything it
/// sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command: Command,
    shape: Shape,
    /// Operand 1 followed by operand 2, each `shape.elements()` long.
    operands: Vec<u32>,
}

impl Request {
    /// Vector add request.
    pub fn vector_add(v1: &[u32], v2: &[u32]) -> Result<Self, ShapeError> {
        Self::vector(Command::VectorAdd, v1, v2)
    }

    /// Element-wise vector multiply request.
    pub fn vector_multiply(v1: &[u32], v2: &[u32]) -> Result<Self, ShapeError> {
        Self::vector(Command::VectorMultiply, v1, v2)
    }

    /// Dot product request.
    pub fn vector_dot(v1: &[u32], v2: &[u32]) -> Result<Self, ShapeError> {
        Self::vector(Command::VectorDotProduct, v1, v2)
    }

    /// Matrix add request. Operands are flattened row-major.
    pub fn matrix_add<R: AsRef<[u32]>>(m1: &[R], m2: &[R]) -> Result<Self, ShapeError> {
        let shape = Shape::of_matrices(m1, m2)?;
        let mut operands = Vec::with_capacity(2 * shape.elements());
        for row in m1.iter().chain(m2) {
            operands.extend_from_slice(row.as_ref());
        }
        Ok(Self {
            command: Command::MatrixAdd,
            shape,
            operands,
        })
    }

    fn vector(command: Command, v1: &[u32], v2: &[u32]) -> Result<Self, ShapeError> {
        let shape = Shape::of_vectors(v1, v2)?;
        let mut operands = Vec::with_capacity(v1.len() + v2.len());
        operands.extend_from_slice(v1);
        operands.extend_from_slice(v2);
        Ok(Self {
            command,
            shape,
            operands,
        })
    }

    /// The request's command.
    pub fn command(&self) -> Command {
        self.command
    }

    /// The operands' shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Both operands, in wire order.
    pub fn operands(&self) -> (&[u32], &[u32]) {
        self.operands.split_at(self.shape.elements())
    }

    /// Size of the encoded frame in bytes.
    pub fn encoded_len(&self) -> usize {
        self.command.header_size() + self.operands.len() * WORD_SIZE
    }

    /// Number of words the peer sends back.
    pub fn response_words(&self) -> usize {
        match self.command {
            Command::VectorDotProduct => 1,
            _ => self.shape.elements(),
        }
    }

    /// Number of bytes the peer sends back.
    pub fn response_len(&self) -> usize {
        self.response_words() * WORD_SIZE
    }

    /// Serialize the full frame.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.push(self.command.as_byte());
        match self.shape {
            Shape::Vector { len } => put_words(&mut buf, &[len]),
            Shape::Matrix { rows, cols } => put_words(&mut buf, &[rows, cols]),
        }
        put_words(&mut buf, &self.operands);
        buf
    }

    /// Parse a complete request frame.
    ///
    /// `bytes` must hold exactly one frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let opcode = *bytes.first().ok_or(FrameError::TooShort {
            expected: VECTOR_HEADER_SIZE,
            actual: 0,
        })?;
        let command = Command::from_byte(opcode).ok_or(FrameError::InvalidCommand(opcode))?;

        let header_size = command.header_size();
        if bytes.len() < header_size {
            return Err(FrameError::TooShort {
                expected: header_size,
                actual: bytes.len(),
            });
        }

        let shape = if command.is_matrix() {
            Shape::Matrix {
                rows: decode_word(&bytes[1..])?,
                cols: decode_word(&bytes[1 + WORD_SIZE..])?,
            }
        } else {
            Shape::Vector {
                len: decode_word(&bytes[1..])?,
            }
        };

        let expected = shape
            .checked_elements()
            .and_then(|elements| elements.checked_mul(2 * WORD_SIZE))
            .and_then(|payload| payload.checked_add(header_size))
            .unwrap_or(usize::MAX);
        if bytes.len() < expected {
            return Err(FrameError::TooShort {
                expected,
                actual: bytes.len(),
            });
        }
        if bytes.len() > expected {
            return Err(FrameError::TrailingBytes {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            command,
            shape,
            operands: decode_words(&bytes[header_size..])?,
        })
    }

    /// Assemble the response words for this request.
    pub fn decode_response(&self, words: Vec<u32>) -> Result<Response, FrameError> {
        let expected = self.response_words();
        if words.len() != expected {
            return Err(FrameError::WordCountMismatch {
                expected,
                actual: words.len(),
            });
        }

        Ok(match (self.command, self.shape) {
            (Command::VectorDotProduct, _) => Response::Scalar(words[0]),
            (_, Shape::Matrix { rows, cols }) => Response::Matrix(split_rows(words, rows, cols)?),
            (_, Shape::Vector { .. }) => Response::Vector(words),
        })
    }

    /// Decode raw response bytes for this request.
    pub fn decode_response_bytes(&self, bytes: &[u8]) -> Result<Response, FrameError> {
        self.decode_response(decode_words(bytes)?)
    }
}

/// Reassemble row-major words into `rows` rows of `cols` words.
///
/// With `cols == 0` the row count is not bounded by `words`, so the rows are
/// reserved fallibly.
pub fn split_rows(words: Vec<u32>, rows: u32, cols: u32) -> Result<Vec<Vec<u32>>, FrameError> {
    if cols == 0 {
        let mut empty = Vec::new();
        empty
            .try_reserve_exact(rows as usize)
            .map_err(|_| FrameError::TooLarge { rows })?;
        empty.resize(rows as usize, Vec::new());
        return Ok(empty);
    }
    Ok(words
        .chunks_exact(cols as usize)
        .map(<[u32]>::to_vec)
        .collect())
}

/// A decoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Element-wise result of add or multiply.
    Vector(Vec<u32>),
    /// Dot product.
    Scalar(u32),
    /// Matrix result, one `Vec` per row.
    Matrix(Vec<Vec<u32>>),
}

impl Response {
    /// Serialize as the peer would send it.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Response::Vector(values) => put_words(&mut buf, values),
            Response::Scalar(value) => put_words(&mut buf, &[*value]),
            Response::Matrix(rows) => {
                for row in rows {
                    put_words(&mut buf, row);
                }
            }
        }
        buf
    }

    /// The vector result, if this is one.
    pub fn into_vector(self) -> Option<Vec<u32>> {
        match self {
            Response::Vector(values) => Some(values),
            _ => None,
        }
    }

    /// The scalar result, if this is one.
    pub fn into_scalar(self) -> Option<u32> {
        match self {
            Response::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// The matrix result, if this is one.
    pub fn into_matrix(self) -> Option<Vec<Vec<u32>>> {
        match self {
            Response::Matrix(rows) => Some(rows),
            _ => None,
        }
    }
}
