//! One run of the weekly deck assembly: stage, compose, name, write.

use std::path::{Path, PathBuf};

use crate::common::Result;
use crate::compose::{append_slides_verbatim, append_song_slides, retain_title_slide};
use crate::config::PipelineConfig;
use crate::deck::Presentation;
use crate::naming::{self, Clock, SystemClock};
use crate::store::{FileStore, LocalStore, Staging};

/// Announcements deck compiled into the binary.
pub const BUNDLED_ANNOUNCEMENTS: &[u8] = include_bytes!("../resources/announcements.ppt");

/// Inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub title_deck: PathBuf,
    /// Song decks in the order their slides are appended
    pub song_decks: Vec<PathBuf>,
}

impl Request {
    pub fn new(title_deck: impl Into<PathBuf>, song_decks: Vec<PathBuf>) -> Self {
        Self {
            title_deck: title_deck.into(),
            song_decks,
        }
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    store: Box<dyn FileStore>,
    clock: Box<dyn Clock>,
    announcements: Vec<u8>,
}

impl Pipeline {
    /// A pipeline on the local file system and the wall clock.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            store: Box::new(LocalStore),
            clock: Box::new(SystemClock),
            announcements: BUNDLED_ANNOUNCEMENTS.to_vec(),
        }
    }

    pub fn with_store(mut self, store: Box<dyn FileStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the bundled announcements deck.
    pub fn with_announcements(mut self, deck: Vec<u8>) -> Self {
        self.announcements = deck;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build the deck and return the absolute path it was written to.
    ///
    /// Nothing is written unless every input loads. The staging directory is removed
    /// on every exit path.
    pub fn run(&self, request: &Request) -> Result<PathBuf> {
        let mut staging = Staging::new(self.store.as_ref(), &self.config.staging_dir);
        let title_copy = staging.stage(&request.title_deck)?;
        let song_copies = request
            .song_decks
            .iter()
            .map(|path| staging.stage(path))
            .collect::<Result<Vec<_>>>()?;
        log::info!(
            "staged {} decks in {}",
            staging.len(),
            staging.root().display()
        );

        let mut deck = self.load(&title_copy)?;
        retain_title_slide(&mut deck);

        for (path, copy) in request.song_decks.iter().zip(&song_copies) {
            let added = append_song_slides(&mut deck, self.load(copy)?);
            log::info!("added {added} song slides from {}", path.display());
        }

        let announcements = match &self.config.announcements_override {
            Some(path) => {
                let copy = staging.stage(path)?;
                self.load(&copy)?
            },
            None => self.load_bundled_announcements()?,
        };
        let added = append_slides_verbatim(&mut deck, announcements);
        log::info!("added {added} announcement slides");

        let output = self
            .output_dir(&request.title_deck)
            .join(naming::file_name(self.clock.as_ref()));
        let bytes = deck.to_bytes()?;
        self.store.write(&output, &bytes)?;
        let output = std::path::absolute(&output)?;
        log::info!(
            "wrote {} slides ({} bytes) to {}",
            deck.slide_count(),
            bytes.len(),
            output.display()
        );
        Ok(output)
    }

    fn load(&self, path: &Path) -> Result<Presentation> {
        log::debug!("loading {}", path.display());
        Presentation::from_bytes(&self.store.read(path)?)
    }

    /// Write the bundled deck to its working file, read it back, remove the file.
    fn load_bundled_announcements(&self) -> Result<Presentation> {
        let file = &self.config.announcements_file;
        self.store.write(file, &self.announcements)?;
        let loaded = self.load(file);
        if let Err(e) = self.store.delete(file) {
            log::warn!("failed to remove {}: {e}", file.display());
        }
        loaded
    }

    fn output_dir(&self, title_deck: &Path) -> PathBuf {
        if let Some(dir) = &self.config.output_dir {
            return dir.clone();
        }
        match title_deck.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_defaults_to_title_directory() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        assert_eq!(
            pipeline.output_dir(Path::new("/decks/title.ppt")),
            PathBuf::from("/decks")
        );
        assert_eq!(pipeline.output_dir(Path::new("title.ppt")), PathBuf::from("."));

        let config = PipelineConfig {
            output_dir: Some(PathBuf::from("/out")),
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(config);
        assert_eq!(
            pipeline.output_dir(Path::new("/decks/title.ppt")),
            PathBuf::from("/out")
        );
    }

    #[test]
    fn test_bundled_announcements_load() {
        let deck = Presentation::from_bytes(BUNDLED_ANNOUNCEMENTS).unwrap();
        assert!(deck.slide_count() > 0);
    }
}
