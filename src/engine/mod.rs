//! VPU protocol engine.
//!
//! The engine turns operands into request frames, writes them, and reads
//! back exactly the response each request implies:
//!
//! - [`Accelerator`]: blocking engine over a [`ByteChannel`](crate::channel::ByteChannel)
//! - [`AsyncAccelerator`]: tokio engine over `AsyncRead + AsyncWrite`
//!   (requires `async` feature)
//! - [`ProtocolError`]: failures tagged with the exchange [`Phase`]
//!
//! # Exchange
//!
//! ```text
//!   host                                   accelerator
//!    │  [op][size..][operand 1][operand 2]      │
//!    │ ───────────────────────────────────────► │
//!    │            [word][word]...               │
//!    │ ◄─────────────────────────────────────── │
//! ```
//!
//! The reply has no header; its length is known only from the request.

mod accelerator;
#[cfg(feature = "async")]
mod async_accelerator;
mod error;

pub use accelerator::Accelerator;
#[cfg(feature = "async")]
pub use async_accelerator::AsyncAccelerator;
pub use error::*;
