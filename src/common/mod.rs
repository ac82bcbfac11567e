//! Types shared across the container, codec and pipeline layers.

pub mod binary;
pub mod error;

pub use error::{Error, Result};
