//! Error types for loading the character database.

use std::path::PathBuf;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Failures that prevent the character database from being loaded.
///
/// All of these are fatal at startup. Resolution itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unable to read / open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Unable to decode {path}: the file is not valid UTF-8 (byte {valid_up_to}). \
         This is normally due to saving the CSV with an incompatible encoding."
    )]
    Encoding { path: PathBuf, valid_up_to: usize },

    #[error(
        "Unable to parse {path}: {source}. If you have recently edited this file, \
         please try reverting to a previous version. This error is normally due to \
         using special characters, or saving the CSV in an incompatible format."
    )]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is missing the required column '{column}'")]
    MissingColumn { path: PathBuf, column: &'static str },
}
