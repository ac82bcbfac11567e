//! File access used by the pipeline, and the scoped staging area for input copies.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::common::Result;

/// Copy, read, write and delete operations on a file system.
pub trait FileStore {
    /// Copy `from` to `to`, creating missing parent directories of `to`.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write `data` to `path`, creating missing parent directories.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Remove a file, or a directory with everything in it. Missing paths are not an error.
    fn delete(&self, path: &Path) -> Result<()>;
}

/// The local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

fn with_path(err: io::Error, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {err}", path.display()))
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

impl FileStore for LocalStore {
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        ensure_parent(to).map_err(|e| with_path(e, to))?;
        fs::copy(from, to).map_err(|e| with_path(e, from))?;
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path).map_err(|e| with_path(e, path))?)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        ensure_parent(path).map_err(|e| with_path(e, path))?;
        fs::write(path, data).map_err(|e| with_path(e, path))?;
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        let removed = match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
            Ok(_) => fs::remove_file(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        };
        Ok(removed.map_err(|e| with_path(e, path))?)
    }
}

/// Directory holding copies of the inputs for one run.
///
/// The directory and everything in it is removed when the guard drops, whether the run
/// succeeded, failed or unwound.
pub struct Staging<'a> {
    store: &'a dyn FileStore,
    root: PathBuf,
    staged: usize,
}

impl<'a> Staging<'a> {
    pub fn new(store: &'a dyn FileStore, root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            root: root.into(),
            staged: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy `source` into the staging directory and return the copy's path.
    ///
    /// Copies are prefixed with their staging order, so inputs sharing a file name
    /// do not overwrite each other.
    pub fn stage(&mut self, source: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "deck.ppt".to_string());
        let target = self.root.join(format!("{:02}_{name}", self.staged));
        self.store.copy(source, &target)?;
        self.staged += 1;
        log::debug!("staged {} as {}", source.display(), target.display());
        Ok(target)
    }

    /// Number of files staged so far.
    pub fn len(&self) -> usize {
        self.staged
    }

    pub fn is_empty(&self) -> bool {
        self.staged == 0
    }
}

impl Drop for Staging<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.store.delete(&self.root) {
            log::warn!("failed to remove staging area {}: {e}", self.root.display());
        }
    }
}
