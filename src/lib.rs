//! # VPU Protocol
//!
//! Host-side driver for the UART **V**ector **P**rocessing **U**nit: an FPGA
//! accelerator that adds, multiplies and dot-multiplies u32 vectors and adds
//! u32 matrices. It provides:
//!
//! - **Codec**: byte-exact request frames, little-endian u32 words
//! - **Engine**: half-duplex exchanges that read back exactly the response
//!   each request implies
//! - **Channels**: serial port, generic blocking stream, in-memory test double
//! - **Simulation**: a driver for the simulated processor core
//!
//! ## Feature Flags
//!
//! - `serial` (default): [`SerialChannel`](channel::SerialChannel) over the
//!   `serialport` crate
//! - `async`: [`AsyncAccelerator`](engine::AsyncAccelerator) over tokio streams
//! - `sim`: [`sim::CoreSimulator`] process driver
//!
//! ## Modules
//!
//! - [`core`]: Constants, shapes, and caller-side errors (always included)
//! - [`codec`]: Request/response frames
//! - [`channel`]: The [`ByteChannel`](channel::ByteChannel) abstraction
//! - [`engine`]: The protocol engines and [`ProtocolError`]
//!
//! ## Example Usage
//!
//! ```rust
//! use vpu_protocol::prelude::*;
//!
//! // Peer replies 11, 22
//! let mut channel = MemoryChannel::with_reply(&[0x0B, 0, 0, 0, 0x16, 0, 0, 0]);
//!
//! let mut vpu = Accelerator::new(&mut channel);
//! let sum = vpu.vector_add(&[1, 2], &[10, 20])?;
//! assert_eq!(sum, vec![11, 22]);
//!
//! // Unequal lengths never reach the wire
//! assert!(vpu.vector_dot(&[1, 2], &[3]).is_err());
//!
//! // Dropping the engine closes the borrowed channel too
//! drop(vpu);
//! assert!(channel.is_closed());
//! # Ok::<(), ProtocolError>(())
//! ```
//!
//! With real hardware:
//!
//! ```rust,ignore
//! let config = SerialConfig::new("/dev/ttyUSB0").baud_rate(115_200);
//! let mut vpu = Accelerator::open(&config)?;
//! let dot = vpu.vector_dot(&[1, 2, 3], &[4, 5, 6])?;
//! vpu.close()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod channel;
pub mod codec;
pub mod core;
pub mod engine;

// Simulated core driver (feature-gated)
#[cfg(feature = "sim")]
#[cfg_attr(docsrs, doc(cfg(feature = "sim")))]
pub mod sim;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::channel::{ByteChannel, MemoryChannel, StreamChannel};
    pub use crate::codec::{Command, FrameError, Request, Response};
    pub use crate::core::{Shape, ShapeError};
    pub use crate::engine::{Accelerator, Phase, ProtocolError, ProtocolResult};

    #[cfg(feature = "serial")]
    pub use crate::channel::{SerialChannel, SerialConfig};

    #[cfg(feature = "async")]
    pub use crate::engine::AsyncAccelerator;

    #[cfg(feature = "sim")]
    pub use crate::sim::{CoreOp, CoreSimulator, SimError, SimulatorConfig};
}

// Re-export commonly used items at crate root
pub use crate::codec::{Command, Request, Response};
pub use crate::core::{Shape, ShapeError};
pub use crate::engine::{Accelerator, ProtocolError, ProtocolResult};

#[cfg(feature = "async")]
pub use crate::engine::AsyncAccelerator;
