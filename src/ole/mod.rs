//! OLE2 compound file support.
//!
//! A legacy `.ppt` deck is a compound file holding the `PowerPoint Document`,
//! `Current User` and optional `Pictures` streams. [`OleFile`] reads one from
//! any `Read + Seek` source and [`OleWriter`] produces a new one from a set
//! of named streams.

pub mod consts;
pub mod file;
pub mod writer;

pub use file::{DirectoryEntry, OleError, OleFile, is_ole_file};
pub use writer::OleWriter;
