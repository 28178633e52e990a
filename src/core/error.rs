//! Caller-side error types.

use thiserror::Error;

/// Operands that cannot form a valid request.
///
/// Always detected before any byte reaches the channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Vector operands differ in length.
    #[error("vector length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first operand.
        left: usize,
        /// Length of the second operand.
        right: usize,
    },

    /// Matrix operands differ in row count.
    #[error("matrix row count mismatch: {left} vs {right}")]
    RowMismatch {
        /// Rows in the first operand.
        left: usize,
        /// Rows in the second operand.
        right: usize,
    },

    /// Matrix operands differ in column count.
    #[error("matrix column count mismatch: {left} vs {right}")]
    ColumnMismatch {
        /// Columns in the first operand.
        left: usize,
        /// Columns in the second operand.
        right: usize,
    },

    /// A matrix row is not as long as the first row.
    #[error("ragged matrix: row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Column count taken from the first row.
        expected: usize,
        /// Column count of the offending row.
        actual: usize,
    },

    /// A dimension does not fit the 32-bit size field.
    #[error("dimension {0} does not fit in a u32 size field")]
    TooLarge(usize),
}
