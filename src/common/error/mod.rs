//! Unified error type for praisedeck.
//!
//! Lower layers (`OleError`, `BinaryError`) keep their own enums and are
//! folded into [`Error`] through the conversions in this module.

pub mod conversions;
pub mod types;

pub use types::{Error, Result};
