use std::fmt::{self, Debug, Display};
use std::io;

use truthlink_barcode::LocatorError;

/// Provides `TruthLinkError` and maps other errors to it.
///
/// Only configuration and persistence return errors. Resolving a link never does: a link that cannot be resolved
/// simply yields no particle.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum TruthLinkError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    EncodeError(bincode::error::EncodeError),
    DecodeError(bincode::error::DecodeError),
    LocatorError(LocatorError),
    ConfigError(String),
    RegistryError(String),
}

impl From<io::Error> for TruthLinkError {
    fn from(error: io::Error) -> Self {
        TruthLinkError::IoError(error)
    }
}

impl From<serde_json::Error> for TruthLinkError {
    fn from(error: serde_json::Error) -> Self {
        TruthLinkError::JsonError(error)
    }
}

impl From<bincode::error::EncodeError> for TruthLinkError {
    fn from(error: bincode::error::EncodeError) -> Self {
        TruthLinkError::EncodeError(error)
    }
}

impl From<bincode::error::DecodeError> for TruthLinkError {
    fn from(error: bincode::error::DecodeError) -> Self {
        TruthLinkError::DecodeError(error)
    }
}

impl From<LocatorError> for TruthLinkError {
    fn from(error: LocatorError) -> Self {
        TruthLinkError::LocatorError(error)
    }
}

impl std::error::Error for TruthLinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TruthLinkError::IoError(e) => Some(e),
            TruthLinkError::JsonError(e) => Some(e),
            TruthLinkError::EncodeError(e) => Some(e),
            TruthLinkError::DecodeError(e) => Some(e),
            TruthLinkError::LocatorError(e) => Some(e),
            TruthLinkError::ConfigError(_) | TruthLinkError::RegistryError(_) => None,
        }
    }
}

impl Display for TruthLinkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TruthLinkError::IoError(e) => write!(f, "IO error: {e}"),
            TruthLinkError::JsonError(e) => write!(f, "JSON error: {e}"),
            TruthLinkError::EncodeError(e) => write!(f, "encoding error: {e}"),
            TruthLinkError::DecodeError(e) => write!(f, "decoding error: {e}"),
            TruthLinkError::LocatorError(e) => write!(f, "locator error: {e}"),
            TruthLinkError::ConfigError(msg) => write!(f, "configuration error: {msg}"),
            TruthLinkError::RegistryError(msg) => write!(f, "registry error: {msg}"),
        }
    }
}
