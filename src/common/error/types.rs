use thiserror::Error;

/// Main error type for deck loading, composition and output.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a legacy PowerPoint presentation
    #[error("Not a PowerPoint presentation: {0}")]
    NotPresentation(String),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Corrupted or malformed record structure
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    /// Stream or record not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// Unsupported feature (encrypted decks, oversized drawings)
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error came from the filesystem rather than the deck contents.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type for praisedeck operations.
pub type Result<T> = std::result::Result<T, Error>;
