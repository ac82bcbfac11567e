//! `From` conversions from the layer-specific error enums.

use super::types::Error;
use crate::common::binary::BinaryError;
use crate::ole::OleError;

impl From<OleError> for Error {
    fn from(err: OleError) -> Self {
        match err {
            OleError::Io(e) => Error::Io(e),
            OleError::NotOleFile => {
                Error::NotPresentation("missing compound file signature".to_string())
            },
            OleError::InvalidFormat(s) | OleError::InvalidData(s) => Error::InvalidFormat(s),
            OleError::CorruptedFile(s) => Error::CorruptedFile(s),
            OleError::StreamNotFound(name) => Error::ComponentNotFound(name),
        }
    }
}

impl From<BinaryError> for Error {
    fn from(err: BinaryError) -> Self {
        Error::CorruptedFile(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
