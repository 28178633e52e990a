//! Protocol constants for the VPU serial link.
//!
//! These values are fixed by the accelerator's UART front end and MUST NOT
//! be changed.

use std::time::Duration;

// =============================================================================
// OPCODES
// =============================================================================

/// Element-wise vector addition.
pub const OP_VECTOR_ADD: u8 = 0x01;

/// Element-wise vector multiplication.
pub const OP_VECTOR_MULTIPLY: u8 = 0x02;

/// Vector dot product.
pub const OP_VECTOR_DOT: u8 = 0x03;

/// Matrix addition.
pub const OP_MATRIX_ADD: u8 = 0x04;

// =============================================================================
// FRAME SIZES
// =============================================================================

/// Every size field and payload element is one little-endian u32.
pub const WORD_SIZE: usize = 4;

/// Opcode size.
pub const OPCODE_SIZE: usize = 1;

/// Vector request header (opcode + n).
pub const VECTOR_HEADER_SIZE: usize = OPCODE_SIZE + WORD_SIZE;

/// Matrix request header (opcode + rows + cols).
pub const MATRIX_HEADER_SIZE: usize = OPCODE_SIZE + 2 * WORD_SIZE;

// =============================================================================
// SERIAL DEFAULTS
// =============================================================================

/// Baud rate the accelerator's UART is synthesized for.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Time allowed for each 4-byte word of a response to arrive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause after opening the port before the first exchange.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Default device path.
#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM3";

/// Default device path.
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
