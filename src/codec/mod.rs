//! Wire codec for the VPU serial protocol.
//!
//! - **Words**: every size field and payload element is a little-endian u32
//! - **Requests**: [`Request`] builds and parses command frames
//! - **Responses**: [`Response`] is assembled from exactly the number of
//!   words the request implies; the wire carries no length or status

mod frame;
mod word;

pub use frame::*;
pub use word::*;
