//! Pipeline settings.
//!
//! Every field has a default, so a config file only needs the keys it changes:
//!
//! ```toml
//! staging_dir = "/var/tmp/praisedeck"
//! output_dir = "/srv/decks"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding staged input copies; removed at the end of every run
    pub staging_dir: PathBuf,
    /// Where the bundled announcements deck is written before it is read
    pub announcements_file: PathBuf,
    /// Announcements deck to use instead of the bundled one
    pub announcements_override: Option<PathBuf>,
    /// Output directory; the title deck's directory when unset
    pub output_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("tmp"),
            announcements_file: PathBuf::from("announcements.ppt"),
            announcements_override: None,
            output_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml(&text)?;
        log::info!("loaded config from {}", path.display());
        log::debug!("config: {config:?}");
        Ok(config)
    }
}
