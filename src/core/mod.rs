//! Core types for the VPU protocol.
//!
//! This module contains constants, operand shapes, and caller-side errors
//! shared by the codec and the engines.

pub mod constants;
mod error;
mod shape;

pub use constants::*;
pub use error::*;
pub use shape::*;
