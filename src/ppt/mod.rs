//! Legacy PowerPoint (`.ppt`) binary format.
//!
//! [`reader`] decodes the `PowerPoint Document` stream into the deck model and
//! [`writer`] encodes a deck back as a fresh, single-edit file. Everything the deck
//! model does not understand (masters, fonts, notes masters, other streams) is
//! carried through [`document::DocumentTemplate`] unchanged.

use std::fs;
use std::path::Path;

use crate::common::Result;
use crate::deck::Presentation;

pub mod current_user;
pub mod document;
pub mod escher;
pub mod persist;
pub mod pictures;
pub mod reader;
pub mod records;
pub mod skeleton;
pub mod text_prop;
pub mod writer;

/// Stream holding the record tree
pub const DOCUMENT_STREAM: &str = "PowerPoint Document";
/// Stream pointing at the newest edit
pub const CURRENT_USER_STREAM: &str = "Current User";
/// Stream holding delayed blip data
pub const PICTURES_STREAM: &str = "Pictures";

/// Read and decode a deck from disk.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Presentation> {
    let data = fs::read(path.as_ref())?;
    log::debug!("read {} bytes from {}", data.len(), path.as_ref().display());
    Presentation::from_bytes(&data)
}

/// Encode a deck and write it to disk, replacing any existing file.
pub fn save<P: AsRef<Path>>(presentation: &Presentation, path: P) -> Result<()> {
    let bytes = presentation.to_bytes()?;
    fs::write(path.as_ref(), &bytes)?;
    log::debug!("wrote {} bytes to {}", bytes.len(), path.as_ref().display());
    Ok(())
}
